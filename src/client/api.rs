use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::detail::ErrorDetail;
use crate::profiles::dto::Profile;
use crate::validation::Draft;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, thiserror::Error)]
pub enum ApiFailure {
    /// The backend answered with a non-success status.
    #[error("request rejected with status {status}")]
    Rejected {
        status: u16,
        detail: Option<ErrorDetail>,
    },
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(String),
    /// The response could not be read as the expected JSON.
    #[error("unreadable response: {0}")]
    Decode(String),
}

/// Backend operations used by the form and the shell.
pub trait ProfileApi {
    fn list(&self) -> Result<Vec<Profile>, ApiFailure>;
    fn get(&self, id: i64) -> Result<Profile, ApiFailure>;
    fn create(&self, draft: &Draft) -> Result<Profile, ApiFailure>;
    fn update(&self, id: i64, draft: &Draft) -> Result<Profile, ApiFailure>;
    fn delete(&self, id: i64) -> Result<(), ApiFailure>;
}

pub struct HttpProfileApi {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpProfileApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::Agent::new(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/api/profiles", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/api/profiles/{}", self.base_url, id)
    }

    fn body(draft: &Draft) -> Result<serde_json::Value, ApiFailure> {
        serde_json::to_value(draft).map_err(|e| ApiFailure::Decode(e.to_string()))
    }
}

fn finish(result: Result<ureq::Response, ureq::Error>) -> Result<ureq::Response, ApiFailure> {
    match result {
        Ok(r) => Ok(r),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            debug!(status = code, body = %body, "request rejected");
            Err(ApiFailure::Rejected {
                status: code,
                detail: ErrorDetail::from_body(&body),
            })
        }
        Err(e) => Err(ApiFailure::Transport(e.to_string())),
    }
}

fn read_json<T: DeserializeOwned>(resp: ureq::Response) -> Result<T, ApiFailure> {
    resp.into_json::<T>()
        .map_err(|e| ApiFailure::Decode(e.to_string()))
}

impl ProfileApi for HttpProfileApi {
    fn list(&self) -> Result<Vec<Profile>, ApiFailure> {
        read_json(finish(self.agent.get(&self.collection_url()).call())?)
    }

    fn get(&self, id: i64) -> Result<Profile, ApiFailure> {
        read_json(finish(self.agent.get(&self.item_url(id)).call())?)
    }

    fn create(&self, draft: &Draft) -> Result<Profile, ApiFailure> {
        let resp = self
            .agent
            .post(&self.collection_url())
            .set("Content-Type", "application/json")
            .send_json(Self::body(draft)?);
        read_json(finish(resp)?)
    }

    fn update(&self, id: i64, draft: &Draft) -> Result<Profile, ApiFailure> {
        let resp = self
            .agent
            .put(&self.item_url(id))
            .set("Content-Type", "application/json")
            .send_json(Self::body(draft)?);
        read_json(finish(resp)?)
    }

    fn delete(&self, id: i64) -> Result<(), ApiFailure> {
        finish(self.agent.delete(&self.item_url(id)).call())?;
        Ok(())
    }
}
