use tracing::{debug, info, warn};

use crate::error::ProfileError;
use crate::profiles::dto::{Pagination, Profile, ProfilePayload, SearchQuery};
use crate::profiles::repo::ProfileStore;
use crate::profiles::repo_types::{normalize_email, ProfileFields};
use crate::validation::{validate_stored, Draft};

/// Normalises the email, then applies the storage rules.
fn checked(mut draft: Draft) -> Result<ProfileFields, ProfileError> {
    draft.email = normalize_email(&draft.email);
    let errors = validate_stored(&draft);
    if !errors.is_empty() {
        debug!(fields = ?errors, "profile validation failed");
        return Err(ProfileError::Validation(errors));
    }
    Ok(ProfileFields::from(draft))
}

pub async fn list_profiles(
    store: &dyn ProfileStore,
    page: &Pagination,
) -> Result<Vec<Profile>, ProfileError> {
    let (skip, limit) = page.clamped();
    let rows = store.list(skip, limit).await?;
    Ok(rows.into_iter().map(Profile::from).collect())
}

pub async fn get_profile(store: &dyn ProfileStore, id: i64) -> Result<Profile, ProfileError> {
    store
        .get(id)
        .await?
        .map(Profile::from)
        .ok_or(ProfileError::NotFound(id))
}

pub async fn search_profiles(
    store: &dyn ProfileStore,
    query: &SearchQuery,
) -> Result<Vec<Profile>, ProfileError> {
    let rows = store.search(query).await?;
    Ok(rows.into_iter().map(Profile::from).collect())
}

pub async fn create_profile(
    store: &dyn ProfileStore,
    payload: ProfilePayload,
) -> Result<Profile, ProfileError> {
    let fields = checked(payload.apply_to(Draft::default()))?;

    if store.email_taken(&fields.email, None).await? {
        warn!(email = %fields.email, "email already registered");
        return Err(ProfileError::EmailTaken(fields.email));
    }

    let row = store.insert(fields).await?;
    info!(profile_id = row.id, email = %row.email, "profile created");
    Ok(row.into())
}

/// Fields absent from `payload` keep their stored values.
pub async fn update_profile(
    store: &dyn ProfileStore,
    id: i64,
    payload: ProfilePayload,
) -> Result<Profile, ProfileError> {
    let current = store.get(id).await?.ok_or(ProfileError::NotFound(id))?;

    let fields = checked(payload.apply_to(current.to_draft()))?;

    if normalize_email(&current.email) != fields.email
        && store.email_taken(&fields.email, Some(id)).await?
    {
        warn!(profile_id = id, email = %fields.email, "email already registered");
        return Err(ProfileError::EmailTaken(fields.email));
    }

    let row = store
        .update(id, fields)
        .await?
        .ok_or(ProfileError::NotFound(id))?;
    info!(profile_id = row.id, "profile updated");
    Ok(row.into())
}

pub async fn delete_profile(store: &dyn ProfileStore, id: i64) -> Result<(), ProfileError> {
    if !store.delete(id).await? {
        return Err(ProfileError::NotFound(id));
    }
    info!(profile_id = id, "profile deleted");
    Ok(())
}
