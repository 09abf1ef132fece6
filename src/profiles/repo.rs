use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::error::ProfileError;
use crate::profiles::dto::SearchQuery;
use crate::profiles::repo_types::{ProfileFields, ProfileRow};

/// Persistence for profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<ProfileRow>, ProfileError>;
    async fn get(&self, id: i64) -> Result<Option<ProfileRow>, ProfileError>;
    /// True when another profile (not `except`) already uses `email`.
    async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, ProfileError>;
    async fn insert(&self, fields: ProfileFields) -> Result<ProfileRow, ProfileError>;
    async fn update(&self, id: i64, fields: ProfileFields)
        -> Result<Option<ProfileRow>, ProfileError>;
    async fn delete(&self, id: i64) -> Result<bool, ProfileError>;
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ProfileRow>, ProfileError>;
}

const COLUMNS: &str =
    "id, name, email, bio, avatar_url, phone, location, website, created_at, updated_at";

pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_unique(e: sqlx::Error, email: &str) -> ProfileError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return ProfileError::EmailTaken(email.to_string());
        }
    }
    e.into()
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<ProfileRow>, ProfileError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM user_profiles
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<ProfileRow>, ProfileError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {COLUMNS} FROM user_profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, ProfileError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_profiles
                WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.db)
        .await?;
        Ok(taken)
    }

    async fn insert(&self, f: ProfileFields) -> Result<ProfileRow, ProfileError> {
        sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            INSERT INTO user_profiles (name, email, bio, avatar_url, phone, location, website)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&f.name)
        .bind(&f.email)
        .bind(&f.bio)
        .bind(&f.avatar_url)
        .bind(&f.phone)
        .bind(&f.location)
        .bind(&f.website)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique(e, &f.email))
    }

    async fn update(
        &self,
        id: i64,
        f: ProfileFields,
    ) -> Result<Option<ProfileRow>, ProfileError> {
        sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            UPDATE user_profiles
            SET name = $2, email = $3, bio = $4, avatar_url = $5, phone = $6,
                location = $7, website = $8, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&f.name)
        .bind(&f.email)
        .bind(&f.bio)
        .bind(&f.avatar_url)
        .bind(&f.phone)
        .bind(&f.location)
        .bind(&f.website)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_unique(e, &f.email))
    }

    async fn delete(&self, id: i64) -> Result<bool, ProfileError> {
        let res = sqlx::query("DELETE FROM user_profiles WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn search(&self, q: &SearchQuery) -> Result<Vec<ProfileRow>, ProfileError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM user_profiles
            WHERE ($1::TEXT IS NULL OR strpos(lower(name), $1) > 0)
              AND ($2::TEXT IS NULL OR strpos(lower(email), $2) > 0)
              AND ($3::TEXT IS NULL OR strpos(lower(coalesce(location, '')), $3) > 0)
            ORDER BY id
            "#
        ))
        .bind(q.name())
        .bind(q.email())
        .bind(q.location())
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    rows: BTreeMap<i64, ProfileRow>,
}

/// Process-local store, used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryProfileStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>, ProfileError> {
        self.inner
            .lock()
            .map_err(|_| ProfileError::Internal(anyhow!("profile store lock poisoned")))
    }
}

fn contains(haystack: Option<&str>, needle: Option<String>) -> bool {
    match needle {
        None => true,
        Some(n) => haystack.is_some_and(|h| h.to_lowercase().contains(&n)),
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<ProfileRow>, ProfileError> {
        let inner = self.lock()?;
        Ok(inner
            .rows
            .values()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<ProfileRow>, ProfileError> {
        Ok(self.lock()?.rows.get(&id).cloned())
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, ProfileError> {
        let inner = self.lock()?;
        Ok(inner
            .rows
            .values()
            .any(|r| r.email == email && Some(r.id) != except))
    }

    async fn insert(&self, f: ProfileFields) -> Result<ProfileRow, ProfileError> {
        let mut inner = self.lock()?;
        if inner.rows.values().any(|r| r.email == f.email) {
            return Err(ProfileError::EmailTaken(f.email));
        }
        inner.next_id += 1;
        let row = ProfileRow {
            id: inner.next_id,
            name: f.name,
            email: f.email,
            bio: f.bio,
            avatar_url: f.avatar_url,
            phone: f.phone,
            location: f.location,
            website: f.website,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };
        inner.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        f: ProfileFields,
    ) -> Result<Option<ProfileRow>, ProfileError> {
        let mut inner = self.lock()?;
        if inner.rows.values().any(|r| r.email == f.email && r.id != id) {
            return Err(ProfileError::EmailTaken(f.email));
        }
        let Some(row) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        row.name = f.name;
        row.email = f.email;
        row.bio = f.bio;
        row.avatar_url = f.avatar_url;
        row.phone = f.phone;
        row.location = f.location;
        row.website = f.website;
        row.updated_at = Some(OffsetDateTime::now_utc());
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, ProfileError> {
        Ok(self.lock()?.rows.remove(&id).is_some())
    }

    async fn search(&self, q: &SearchQuery) -> Result<Vec<ProfileRow>, ProfileError> {
        let inner = self.lock()?;
        Ok(inner
            .rows
            .values()
            .filter(|r| {
                contains(Some(&r.name), q.name())
                    && contains(Some(&r.email), q.email())
                    && contains(r.location.as_deref(), q.location())
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, email: &str) -> ProfileFields {
        ProfileFields {
            name: name.into(),
            email: email.into(),
            bio: None,
            avatar_url: None,
            phone: None,
            location: None,
            website: None,
        }
    }

    #[tokio::test]
    async fn memory_store_assigns_increasing_ids() {
        let store = MemoryProfileStore::new();
        let a = store.insert(fields("Ann", "ann@example.com")).await.unwrap();
        let b = store.insert(fields("Bob", "bob@example.com")).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(store.list(0, 100).await.unwrap().len(), 2);
        assert_eq!(store.list(1, 100).await.unwrap()[0].id, b.id);
    }

    #[tokio::test]
    async fn memory_store_rejects_duplicate_email() {
        let store = MemoryProfileStore::new();
        store.insert(fields("Ann", "ann@example.com")).await.unwrap();
        let err = store.insert(fields("Ann2", "ann@example.com")).await.unwrap_err();
        assert!(matches!(err, ProfileError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn memory_store_update_and_delete() {
        let store = MemoryProfileStore::new();
        let a = store.insert(fields("Ann", "ann@example.com")).await.unwrap();
        assert!(!store.email_taken("ann@example.com", Some(a.id)).await.unwrap());
        assert!(store.email_taken("ann@example.com", None).await.unwrap());

        let updated = store
            .update(a.id, fields("Annie", "ann@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Annie");
        assert_eq!(updated.created_at, a.created_at);
        assert!(updated.updated_at.is_some());

        assert!(store.update(999, fields("X", "x@example.com")).await.unwrap().is_none());
        assert!(store.delete(a.id).await.unwrap());
        assert!(!store.delete(a.id).await.unwrap());
        assert!(store.get(a.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_store_search_is_case_insensitive() {
        let store = MemoryProfileStore::new();
        let mut ann = fields("Ann Lee", "ann@example.com");
        ann.location = Some("Berlin".into());
        store.insert(ann).await.unwrap();
        store.insert(fields("Bob Stone", "bob@test.org")).await.unwrap();

        let q = SearchQuery { name: Some("LEE".into()), ..Default::default() };
        assert_eq!(store.search(&q).await.unwrap().len(), 1);

        let q = SearchQuery { location: Some("ber".into()), ..Default::default() };
        let hits = store.search(&q).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ann Lee");

        let q = SearchQuery { email: Some("".into()), ..Default::default() };
        assert_eq!(store.search(&q).await.unwrap().len(), 2);
    }
}
