use sqlx::FromRow;
use time::OffsetDateTime;

use crate::profiles::dto::Profile;
use crate::validation::Draft;

/// Row of the `user_profiles` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            email: r.email,
            bio: r.bio,
            avatar_url: r.avatar_url,
            phone: r.phone,
            location: r.location,
            website: r.website,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl ProfileRow {
    pub fn to_draft(&self) -> Draft {
        Draft::from_profile(&Profile::from(self.clone()))
    }
}

/// Editable columns, already validated and normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFields {
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl From<Draft> for ProfileFields {
    fn from(d: Draft) -> Self {
        let opt = |s: String| if s.trim().is_empty() { None } else { Some(s) };
        Self {
            name: d.name.trim().to_string(),
            email: normalize_email(&d.email),
            bio: opt(d.bio),
            avatar_url: opt(d.avatar_url),
            phone: opt(d.phone),
            location: opt(d.location),
            website: opt(d.website),
        }
    }
}
