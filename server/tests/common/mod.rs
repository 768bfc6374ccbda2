//! Shared helpers for server integration tests.

#![allow(dead_code)]

use moocho_server::handlers::{register_login, IdentityProfile};
use moocho_server::store::{keys, RecordStore, RetryPolicy};
use moocho_engine::UserRecord;

/// Register a user the way the identity provider callback does.
pub async fn register(store: &dyn RecordStore, id: &str, name: &str) {
    register_login(
        store,
        &RetryPolicy::default(),
        IdentityProfile {
            id: id.to_string(),
            display_name: name.to_string(),
            email: Some(format!("{}@example.com", id)),
            access_token: Some(format!("access-{}", id)),
            refresh_token: None,
        },
    )
    .await
    .unwrap();
}

/// Read a user record straight from the store.
pub async fn raw_user(store: &dyn RecordStore, id: &str) -> UserRecord {
    let raw = store.get(&keys::user(id)).await.unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

/// Overwrite a user record straight in the store.
pub async fn put_user(store: &dyn RecordStore, user: &UserRecord) {
    store
        .set(&keys::user(&user.id), &serde_json::to_string(user).unwrap())
        .await
        .unwrap();
}
