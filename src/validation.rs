use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::profiles::dto::Profile;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const BIO_MAX: usize = 1000;
pub const LOCATION_MAX: usize = 100;
pub const PHONE_DIGITS_MIN: usize = 10;
pub const PHONE_DIGITS_MAX: usize = 15;

const EMAIL_MAX: usize = 255;
const AVATAR_URL_MAX: usize = 500;
const PHONE_MAX: usize = 20;
const WEBSITE_MAX: usize = 255;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref NAME_CHARS_RE: Regex = Regex::new(r"^[\p{L}\s\-'\.]+$").unwrap();
    static ref PHONE_CHARS_RE: Regex = Regex::new(r"^[\d\s\-\(\)\+]+$").unwrap();
}

/// Editable profile fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Email,
    Bio,
    AvatarUrl,
    Phone,
    Location,
    Website,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Email,
        Field::Bio,
        Field::AvatarUrl,
        Field::Phone,
        Field::Location,
        Field::Website,
    ];

    /// Wire name, as used in JSON bodies and error mappings.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Bio => "bio",
            Field::AvatarUrl => "avatarUrl",
            Field::Phone => "phone",
            Field::Location => "location",
            Field::Website => "website",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Bio => "Bio",
            Field::AvatarUrl => "Avatar URL",
            Field::Phone => "Phone",
            Field::Location => "Location",
            Field::Website => "Website",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, Field::Name | Field::Email)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown profile field: {0}")]
pub struct UnknownField(String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::Name),
            "email" => Ok(Field::Email),
            "bio" => Ok(Field::Bio),
            "avatarUrl" | "avatar_url" => Ok(Field::AvatarUrl),
            "phone" => Ok(Field::Phone),
            "location" => Ok(Field::Location),
            "website" => Ok(Field::Website),
            other => Err(UnknownField(other.to_string())),
        }
    }
}

/// In-progress profile record. Every field is a plain string and may be
/// empty or invalid until validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    pub name: String,
    pub email: String,
    pub bio: String,
    pub avatar_url: String,
    pub phone: String,
    pub location: String,
    pub website: String,
}

impl Draft {
    pub fn from_profile(profile: &Profile) -> Self {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            bio: opt(&profile.bio),
            avatar_url: opt(&profile.avatar_url),
            phone: opt(&profile.phone),
            location: opt(&profile.location),
            website: opt(&profile.website),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Bio => &self.bio,
            Field::AvatarUrl => &self.avatar_url,
            Field::Phone => &self.phone,
            Field::Location => &self.location,
            Field::Website => &self.website,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Bio => &mut self.bio,
            Field::AvatarUrl => &mut self.avatar_url,
            Field::Phone => &mut self.phone,
            Field::Location => &mut self.location,
            Field::Website => &mut self.website,
        };
        *slot = value.into();
    }
}

/// Field name to user-facing message. A field with no error is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message recorded for a field. Empty messages are
    /// treated as "no error" and dropped.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        if message.is_empty() {
            return;
        }
        self.0.entry(field.into()).or_insert(message);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(field.as_str())
    }

    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }

    /// Overwrites existing messages with the incoming ones. Neither side
    /// holds empty messages, so nothing is removed.
    pub fn merge(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for FieldErrors {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut errors = FieldErrors::new();
        for (field, message) in iter {
            errors.insert(field, message);
        }
        errors
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Client-side rules. Each field is checked on its own; there are no
/// cross-field dependencies.
pub fn validate(draft: &Draft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let name = draft.name.trim();
    if name.is_empty() {
        errors.insert(Field::Name.as_str(), "Name is required");
    } else if char_len(name) < NAME_MIN {
        errors.insert(Field::Name.as_str(), "Name must be at least 2 characters");
    } else if char_len(&draft.name) > NAME_MAX {
        errors.insert(Field::Name.as_str(), "Name must be less than 100 characters");
    }

    if draft.email.trim().is_empty() {
        errors.insert(Field::Email.as_str(), "Email is required");
    } else if !EMAIL_RE.is_match(&draft.email) {
        errors.insert(Field::Email.as_str(), "Invalid email format");
    }

    if char_len(&draft.bio) > BIO_MAX {
        errors.insert(Field::Bio.as_str(), "Bio must be less than 1000 characters");
    }

    if !draft.phone.is_empty() {
        let digits = digit_count(&draft.phone);
        if !(PHONE_DIGITS_MIN..=PHONE_DIGITS_MAX).contains(&digits) {
            errors.insert(
                Field::Phone.as_str(),
                "Phone number must be between 10 and 15 digits",
            );
        }
    }

    if !draft.website.is_empty() && !is_http_url(&draft.website) {
        errors.insert(
            Field::Website.as_str(),
            "Website must start with http:// or https://",
        );
    }

    if char_len(&draft.location) > LOCATION_MAX {
        errors.insert(
            Field::Location.as_str(),
            "Location must be less than 100 characters",
        );
    }

    errors
}

/// Rules applied before a record is persisted: the client rules plus the
/// storage constraints. Only the first failing rule per field is reported.
pub fn validate_stored(draft: &Draft) -> FieldErrors {
    let mut errors = validate(draft);

    let name = draft.name.trim();
    if !name.is_empty() && !NAME_CHARS_RE.is_match(name) {
        errors.insert(
            Field::Name.as_str(),
            "Name can only contain letters, spaces, hyphens, apostrophes, and periods",
        );
    }

    if char_len(&draft.email) > EMAIL_MAX {
        errors.insert(Field::Email.as_str(), "Email must be less than 255 characters");
    }

    let avatar = draft.avatar_url.as_str();
    if !avatar.is_empty() {
        if !is_http_url(avatar) || avatar.chars().any(char::is_whitespace) {
            errors.insert(Field::AvatarUrl.as_str(), "Avatar URL must be a valid URL");
        } else if char_len(avatar) > AVATAR_URL_MAX {
            errors.insert(
                Field::AvatarUrl.as_str(),
                "Avatar URL must be less than 500 characters",
            );
        }
    }

    let phone = draft.phone.as_str();
    if !phone.is_empty() {
        if !PHONE_CHARS_RE.is_match(phone) {
            errors.insert(Field::Phone.as_str(), "Phone number contains invalid characters");
        } else if char_len(phone) > PHONE_MAX {
            errors.insert(
                Field::Phone.as_str(),
                "Phone number must be between 10 and 20 characters",
            );
        }
    }

    if char_len(&draft.website) > WEBSITE_MAX {
        errors.insert(
            Field::Website.as_str(),
            "Website must be less than 255 characters",
        );
    }

    errors
}
