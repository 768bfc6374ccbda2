//! HTTP route definitions.

mod friends;
mod health;
mod ratings;
mod users;

use crate::AppState;
use axum::Router;
use serde::Serialize;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(friends::routes())
        .merge(ratings::routes())
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
