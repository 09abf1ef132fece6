use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::validation::Draft;

/// Profile as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Request body for POST and PUT. A missing field on PUT keeps the stored
/// value; on POST it counts as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

impl ProfilePayload {
    /// Overlays the present fields onto `base`.
    pub fn apply_to(self, mut base: Draft) -> Draft {
        if let Some(v) = self.name {
            base.name = v;
        }
        if let Some(v) = self.email {
            base.email = v;
        }
        if let Some(v) = self.bio {
            base.bio = v;
        }
        if let Some(v) = self.avatar_url {
            base.avatar_url = v;
        }
        if let Some(v) = self.phone {
            base.phone = v;
        }
        if let Some(v) = self.location {
            base.location = v;
        }
        if let Some(v) = self.website {
            base.website = v;
        }
        base
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}
fn default_limit() -> i64 { 100 }

impl Pagination {
    pub const MAX_LIMIT: i64 = 1000;

    pub fn clamped(&self) -> (i64, i64) {
        (self.skip.max(0), self.limit.clamp(1, Self::MAX_LIMIT))
    }
}

/// Case-insensitive substring filters; empty or missing filters match all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
}

impl SearchQuery {
    fn needle(v: &Option<String>) -> Option<String> {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn name(&self) -> Option<String> {
        Self::needle(&self.name)
    }
    pub fn email(&self) -> Option<String> {
        Self::needle(&self.email)
    }
    pub fn location(&self) -> Option<String> {
        Self::needle(&self.location)
    }
}
