//! Rating routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use moocho_engine::{FriendsRatings, RatingSummary};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::handlers;
use crate::AppState;

/// Create rating routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ratings/friends", get(friends_ratings))
        .route("/ratings/{tmdb_id}", get(summary).post(submit))
}

/// Body of a rating submission. Kept untyped so a non-numeric rating is
/// reported like an out-of-range one.
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    #[serde(default)]
    pub rating: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub message: String,
    pub summary: RatingSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendsRatingsQuery {
    pub tmdb_id: Option<String>,
}

/// GET /ratings/{tmdb_id} - Average and count for a movie.
async fn summary(
    State(state): State<AppState>,
    Path(tmdb_id): Path<String>,
) -> Result<Json<RatingSummary>> {
    let summary = handlers::get_summary(state.store(), &tmdb_id).await?;
    Ok(Json(summary))
}

/// POST /ratings/{tmdb_id} - Submit or update the caller's rating.
async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tmdb_id): Path<String>,
    payload: std::result::Result<Json<RatingRequest>, JsonRejection>,
) -> Result<Json<RatingResponse>> {
    let Json(body) = payload?;
    let rating = body.rating.as_f64().ok_or_else(|| {
        AppError::BadRequest("Rating must be a number between 1 and 10".to_string())
    })?;

    let summary = handlers::submit_rating(state.store(), &auth.user_id, &tmdb_id, rating).await?;
    Ok(Json(RatingResponse {
        message: format!("Rating {} saved for TMDB movie {}", rating, tmdb_id),
        summary,
    }))
}

/// GET /ratings/friends?tmdbId= - How the caller's friends rated a movie.
async fn friends_ratings(
    State(state): State<AppState>,
    auth: AuthUser,
    query: std::result::Result<Query<FriendsRatingsQuery>, QueryRejection>,
) -> Result<Json<FriendsRatings>> {
    let Query(query) = query?;
    let tmdb_id = query.tmdb_id.ok_or_else(|| {
        AppError::BadRequest("Missing or invalid tmdbId query parameter".to_string())
    })?;

    let ratings = handlers::get_friends_ratings(state.store(), &auth.user_id, &tmdb_id).await?;
    Ok(Json(ratings))
}
