//! Login callback, profile and user view routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post, put},
    Json, Router,
};
use moocho_engine::{MediaKind, ProfileView, UserView, WatchedItem};
use serde::Deserialize;

use crate::auth::{AuthUser, IdentityProvider};
use crate::error::Result;
use crate::handlers::{self, IdentityProfile};
use crate::AppState;

/// Create user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/identity", post(identity_callback))
        .route("/profile", get(profile))
        .route("/profile/movies/{tmdb_id}", put(watched_movie))
        .route("/profile/shows/{tmdb_id}", put(watched_show))
        .route("/users/{user_id}", get(user_view))
}

/// Body of a watch-list update.
#[derive(Debug, Deserialize)]
pub struct WatchedBody {
    #[serde(default)]
    pub rating: Option<f64>,
}

/// POST /auth/identity - Identity provider reports a successful login.
async fn identity_callback(
    State(state): State<AppState>,
    _provider: IdentityProvider,
    payload: std::result::Result<Json<IdentityProfile>, JsonRejection>,
) -> Result<Json<ProfileView>> {
    let Json(profile) = payload?;
    let view = handlers::register_login(state.store(), state.retry(), profile).await?;
    Ok(Json(view))
}

/// GET /profile - The caller's own profile.
async fn profile(State(state): State<AppState>, auth: AuthUser) -> Result<Json<ProfileView>> {
    let view = handlers::get_profile(state.store(), &auth.user_id).await?;
    Ok(Json(view))
}

/// PUT /profile/movies/{tmdb_id} - Mark a movie as watched.
async fn watched_movie(
    state: State<AppState>,
    auth: AuthUser,
    path: Path<String>,
    payload: std::result::Result<Json<WatchedBody>, JsonRejection>,
) -> Result<Json<WatchedItem>> {
    record_watched(state, auth, MediaKind::Movie, path, payload).await
}

/// PUT /profile/shows/{tmdb_id} - Mark a show as watched.
async fn watched_show(
    state: State<AppState>,
    auth: AuthUser,
    path: Path<String>,
    payload: std::result::Result<Json<WatchedBody>, JsonRejection>,
) -> Result<Json<WatchedItem>> {
    record_watched(state, auth, MediaKind::Show, path, payload).await
}

async fn record_watched(
    State(state): State<AppState>,
    auth: AuthUser,
    kind: MediaKind,
    Path(tmdb_id): Path<String>,
    payload: std::result::Result<Json<WatchedBody>, JsonRejection>,
) -> Result<Json<WatchedItem>> {
    let Json(body) = payload?;
    let item = handlers::record_watched(
        state.store(),
        state.retry(),
        &auth.user_id,
        kind,
        &tmdb_id,
        body.rating,
    )
    .await?;
    Ok(Json(item))
}

/// GET /users/{user_id} - Another user, projected for the caller.
async fn user_view(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserView>> {
    let view = handlers::view_user(state.store(), &auth.user_id, &user_id).await?;
    Ok(Json(view))
}
