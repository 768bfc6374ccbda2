//! Friend request and friend list routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use moocho_engine::{FriendDecision, FriendlyView, PendingRequestView};
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers;
use crate::AppState;

/// Create friend routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/friends/request/{friend_id}", post(send_request))
        .route("/friends/request/{friend_id}/respond", post(respond))
        .route("/friends/requests", get(pending_requests))
        .route("/friends/requests/count", get(pending_count))
        .route("/friends/list", get(friends_list))
}

/// Body of a respond call.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub action: FriendDecision,
}

#[derive(Debug, Serialize)]
pub struct PendingRequestsResponse {
    pub requests: Vec<PendingRequestView>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct FriendsResponse {
    pub friends: Vec<FriendlyView>,
}

/// POST /friends/request/{friend_id} - Send a friend request.
async fn send_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(friend_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    handlers::send_friend_request(state.store(), state.retry(), &auth.user_id, &friend_id)
        .await?;
    Ok(Json(MessageResponse::new("Friend request sent")))
}

/// POST /friends/request/{friend_id}/respond - Accept or reject a request.
async fn respond(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(friend_id): Path<String>,
    payload: std::result::Result<Json<RespondRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(body) = payload?;
    handlers::respond_to_friend_request(
        state.store(),
        state.retry(),
        &auth.user_id,
        &friend_id,
        body.action,
    )
    .await?;
    let verb = match body.action {
        FriendDecision::Accepted => "accepted",
        FriendDecision::Rejected => "rejected",
    };
    Ok(Json(MessageResponse::new(format!("Friend request {}", verb))))
}

/// GET /friends/requests - Incoming pending requests.
async fn pending_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PendingRequestsResponse>> {
    let requests = handlers::list_pending_requests(state.store(), &auth.user_id).await?;
    Ok(Json(PendingRequestsResponse { requests }))
}

/// GET /friends/requests/count - Number of incoming pending requests.
async fn pending_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CountResponse>> {
    let count = handlers::count_pending(state.store(), &auth.user_id).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /friends/list - The caller's friends.
async fn friends_list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<FriendsResponse>> {
    let friends = handlers::list_friends(state.store(), &auth.user_id).await?;
    Ok(Json(FriendsResponse { friends }))
}
