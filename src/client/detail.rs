use serde::Deserialize;
use serde_json::Value;

use crate::validation::FieldErrors;

/// Decoded `detail` of a backend error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// A single message, shown as one alert.
    Message(String),
    /// Several messages, shown joined as one alert.
    Messages(Vec<String>),
    /// Per-field messages, shown inline.
    Fields(FieldErrors),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    detail: Value,
}

fn text_of(v: Value) -> String {
    match v {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl ErrorDetail {
    /// Returns `None` when the body is not JSON or carries no usable
    /// `detail`.
    pub fn from_body(body: &str) -> Option<Self> {
        let envelope: Envelope = serde_json::from_str(body).ok()?;
        Self::from_value(envelope.detail)
    }

    pub fn from_value(detail: Value) -> Option<Self> {
        match detail {
            Value::String(s) if !s.is_empty() => Some(ErrorDetail::Message(s)),
            Value::Array(items) if !items.is_empty() => {
                let messages = items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut obj) => match obj.remove("msg") {
                            Some(msg) if !msg.is_null() => text_of(msg),
                            _ => Value::Object(obj).to_string(),
                        },
                        other => text_of(other),
                    })
                    .collect();
                Some(ErrorDetail::Messages(messages))
            }
            Value::Object(fields) => Some(ErrorDetail::Fields(
                fields.into_iter().map(|(k, v)| (k, text_of(v))).collect(),
            )),
            _ => None,
        }
    }

    /// Text for a blocking alert, or `None` for field errors.
    pub fn alert_text(&self) -> Option<String> {
        match self {
            ErrorDetail::Message(s) => Some(s.clone()),
            ErrorDetail::Messages(v) => Some(v.join(", ")),
            ErrorDetail::Fields(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail() {
        let d = ErrorDetail::from_body(r#"{"detail":"name taken"}"#).unwrap();
        assert_eq!(d, ErrorDetail::Message("name taken".into()));
        assert_eq!(d.alert_text().as_deref(), Some("name taken"));
    }

    #[test]
    fn list_detail_mixes_msg_objects_and_strings() {
        let d = ErrorDetail::from_body(r#"{"detail":[{"msg":"x"},{"msg":"y"},"z"]}"#).unwrap();
        assert_eq!(d.alert_text().as_deref(), Some("x, y, z"));
    }

    #[test]
    fn object_detail_becomes_field_errors() {
        let d = ErrorDetail::from_body(r#"{"detail":{"email":"invalid"}}"#).unwrap();
        let ErrorDetail::Fields(errors) = &d else {
            panic!("expected fields, got {d:?}");
        };
        assert_eq!(errors.get("email"), Some("invalid"));
        assert_eq!(d.alert_text(), None);
    }

    #[test]
    fn missing_or_unusable_detail() {
        assert_eq!(ErrorDetail::from_body("{}"), None);
        assert_eq!(ErrorDetail::from_body(r#"{"error":"x"}"#), None);
        assert_eq!(ErrorDetail::from_body(r#"{"detail":null}"#), None);
        assert_eq!(ErrorDetail::from_body(r#"{"detail":""}"#), None);
        assert_eq!(ErrorDetail::from_body(r#"{"detail":[]}"#), None);
        assert_eq!(ErrorDetail::from_body("<html>502</html>"), None);
    }
}
