//! Moocho Server - friends, profiles and movie ratings over a key-value store.
//!
//! User records, friend requests and rating aggregates all live in a single
//! key-value store. Mutations of shared records go through the optimistic
//! protocol in [`store::optimistic_update`]; the HTTP layer in [`routes`]
//! is a thin adapter over the operations in [`handlers`].

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod store;

use crate::config::Config;
use crate::store::{RecordStore, RetryPolicy};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.config.retry
    }
}

/// Build the application router with its middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
