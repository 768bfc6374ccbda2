//! Friend requests and friend lists.
//!
//! Every mutation runs under [`optimistic_update`], so concurrent requests
//! against the same records never lose each other's writes. Accepting a
//! request writes both participants in the same commit.

use crate::error::{AppError, Result};
use crate::handlers::{load_user, require_user};
use crate::store::{keys, optimistic_update, RecordStore, RetryPolicy, WriteBatch};
use chrono::Utc;
use futures::future::try_join_all;
use moocho_engine::{
    are_friends, to_friendly_view, to_pending_request_view, FriendDecision, FriendlyView,
    PendingRequestView, UserRecord,
};

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// Send a friend request from `sender_id` to `receiver_id`.
pub async fn send_friend_request(
    store: &dyn RecordStore,
    policy: &RetryPolicy,
    sender_id: &str,
    receiver_id: &str,
) -> Result<()> {
    if receiver_id.is_empty() || receiver_id == sender_id {
        return Err(AppError::BadRequest("Invalid friendId".to_string()));
    }

    let receiver_key = keys::user(receiver_id);
    let sender_key = keys::user(sender_id);

    optimistic_update(
        store,
        policy,
        "send friend request",
        &[receiver_key.clone(), sender_key],
        |[receiver, sender]: [Option<UserRecord>; 2]| {
            let mut receiver = receiver.ok_or_else(user_not_found)?;
            let sender = sender.ok_or_else(user_not_found)?;

            if are_friends(&sender, &receiver) {
                return Err(AppError::Conflict("Already friends".to_string()));
            }
            if receiver.pending_request_from(&sender.id).is_some() {
                return Err(AppError::Conflict("Request already sent".to_string()));
            }

            receiver.push_request(&sender.id, Utc::now());

            let batch =
                WriteBatch::new().set(receiver_key.clone(), serde_json::to_string(&receiver)?);
            Ok((batch, ()))
        },
    )
    .await?;

    tracing::debug!(sender = %sender_id, receiver = %receiver_id, "Friend request sent");
    Ok(())
}

/// Accept or reject the pending request `sender_id` sent to `responder_id`.
pub async fn respond_to_friend_request(
    store: &dyn RecordStore,
    policy: &RetryPolicy,
    responder_id: &str,
    sender_id: &str,
    decision: FriendDecision,
) -> Result<()> {
    if sender_id.is_empty() || sender_id == responder_id {
        return Err(AppError::BadRequest("Invalid friendId".to_string()));
    }

    let responder_key = keys::user(responder_id);
    let sender_key = keys::user(sender_id);

    optimistic_update(
        store,
        policy,
        "process friend request",
        &[responder_key.clone(), sender_key.clone()],
        |[responder, sender]: [Option<UserRecord>; 2]| {
            let mut responder = responder.ok_or_else(user_not_found)?;
            let mut sender = sender.ok_or_else(user_not_found)?;

            if !responder.resolve_request(&sender.id, decision) {
                return Err(AppError::BadRequest(
                    "No pending request from this user".to_string(),
                ));
            }

            if decision == FriendDecision::Accepted {
                responder.add_friend(&sender.id);
                sender.add_friend(&responder.id);
            }

            let batch = WriteBatch::new()
                .set(responder_key.clone(), serde_json::to_string(&responder)?)
                .set(sender_key.clone(), serde_json::to_string(&sender)?);
            Ok((batch, ()))
        },
    )
    .await?;

    tracing::debug!(
        responder = %responder_id,
        sender = %sender_id,
        ?decision,
        "Friend request answered"
    );
    Ok(())
}

/// Pending requests addressed to `user_id`, with each sender's public view.
///
/// Requests whose sender record no longer exists are skipped.
pub async fn list_pending_requests(
    store: &dyn RecordStore,
    user_id: &str,
) -> Result<Vec<PendingRequestView>> {
    let user = require_user(store, user_id).await?;

    let resolved = try_join_all(user.pending_requests().map(|request| async move {
        let sender = load_user(store, &request.from).await?;
        if sender.is_none() {
            tracing::warn!(
                user_id = %user_id,
                sender = %request.from,
                "Skipping request from missing user"
            );
        }
        Ok::<_, AppError>(sender.map(|sender| to_pending_request_view(request, &sender)))
    }))
    .await?;

    Ok(resolved.into_iter().flatten().collect())
}

/// Number of pending requests addressed to `user_id`.
pub async fn count_pending(store: &dyn RecordStore, user_id: &str) -> Result<usize> {
    Ok(require_user(store, user_id).await?.pending_count())
}

/// Friend views of everyone in `user_id`'s friend set.
///
/// Ids that no longer resolve to a record are skipped.
pub async fn list_friends(store: &dyn RecordStore, user_id: &str) -> Result<Vec<FriendlyView>> {
    let user = require_user(store, user_id).await?;

    let resolved = try_join_all(user.friends.iter().map(|friend_id| async move {
        let friend = load_user(store, friend_id).await?;
        if friend.is_none() {
            tracing::warn!(user_id = %user_id, friend = %friend_id, "Skipping missing friend");
        }
        Ok::<_, AppError>(friend.map(|friend| to_friendly_view(&friend)))
    }))
    .await?;

    Ok(resolved.into_iter().flatten().collect())
}
