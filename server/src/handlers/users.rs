//! User records: first login, profile, views and watch lists.

use crate::error::{AppError, Result};
use crate::store::{keys, optimistic_update, RecordStore, RetryPolicy, WriteBatch};
use chrono::Utc;
use moocho_engine::{
    to_profile_view, validate_media_id, view_for, MediaKind, ProfileView, Rating, UserRecord,
    UserView, WatchedItem,
};
use serde::Deserialize;

/// Profile handed over by the identity provider after a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Read and decode a user record.
pub async fn load_user(store: &dyn RecordStore, user_id: &str) -> Result<Option<UserRecord>> {
    store
        .get(&keys::user(user_id))
        .await?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(AppError::from)
}

/// Like [`load_user`], but a missing record is `NotFound`.
pub async fn require_user(store: &dyn RecordStore, user_id: &str) -> Result<UserRecord> {
    load_user(store, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Create the record on first login, or refresh the stored tokens.
pub async fn register_login(
    store: &dyn RecordStore,
    policy: &RetryPolicy,
    profile: IdentityProfile,
) -> Result<ProfileView> {
    if profile.id.trim().is_empty() || profile.display_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Identity profile needs an id and a display name".to_string(),
        ));
    }

    let key = keys::user(&profile.id);
    let user = optimistic_update(
        store,
        policy,
        "register login",
        &[key.clone()],
        |[existing]: [Option<UserRecord>; 1]| {
            let mut user = match existing {
                Some(user) => user,
                None => {
                    tracing::info!(user_id = %profile.id, "Creating record on first login");
                    UserRecord::new(
                        profile.id.clone(),
                        profile.display_name.clone(),
                        profile.email.clone(),
                        Utc::now(),
                    )
                }
            };
            user.access_token = profile.access_token.clone();
            user.refresh_token = profile.refresh_token.clone();

            let batch = WriteBatch::new().set(key.clone(), serde_json::to_string(&user)?);
            Ok((batch, user))
        },
    )
    .await?;

    Ok(to_profile_view(&user))
}

/// The caller's own profile.
pub async fn get_profile(store: &dyn RecordStore, user_id: &str) -> Result<ProfileView> {
    let user = require_user(store, user_id).await?;
    Ok(to_profile_view(&user))
}

/// `target_id` as seen by `viewer_id`.
pub async fn view_user(
    store: &dyn RecordStore,
    viewer_id: &str,
    target_id: &str,
) -> Result<UserView> {
    let viewer = require_user(store, viewer_id).await?;
    if viewer.id == target_id {
        return Ok(view_for(&viewer, &viewer));
    }
    let target = require_user(store, target_id).await?;
    Ok(view_for(&viewer, &target))
}

/// Add or replace an entry in the caller's movie or show list.
pub async fn record_watched(
    store: &dyn RecordStore,
    policy: &RetryPolicy,
    user_id: &str,
    kind: MediaKind,
    tmdb_id: &str,
    rating: Option<f64>,
) -> Result<WatchedItem> {
    let tmdb_id = validate_media_id(tmdb_id)?;
    let rating = rating.map(Rating::new).transpose()?;

    let key = keys::user(user_id);
    optimistic_update(
        store,
        policy,
        "update watch list",
        &[key.clone()],
        |[user]: [Option<UserRecord>; 1]| {
            let mut user = user.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            let item = WatchedItem {
                tmdb_id: tmdb_id.to_string(),
                rating,
                watched_at: Utc::now(),
            };
            user.record_watched(kind, item.clone());

            let batch = WriteBatch::new().set(key.clone(), serde_json::to_string(&user)?);
            Ok((batch, item))
        },
    )
    .await
}
