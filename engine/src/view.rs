//! Role-scoped read models of a [`UserRecord`].
//!
//! Each projection builds a new value; the record is never modified and
//! credential memo fields never appear in any view.

use crate::date::format_human_readable;
use crate::friendship::are_friends;
use crate::{Avatar, FriendRequest, RequestStatus, UserId, UserRecord, WatchedItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Full view of the caller's own record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: UserId,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar: Avatar,
    pub movies: Vec<WatchedItem>,
    pub shows: Vec<WatchedItem>,
    pub friends: BTreeSet<UserId>,
    pub requests: Vec<FriendRequest>,
    pub created_at: String,
}

/// What a non-friend may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeView {
    pub id: UserId,
    pub display_name: String,
    pub avatar: Avatar,
}

/// What a friend may see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendlyView {
    pub id: UserId,
    pub display_name: String,
    pub avatar: Avatar,
    pub movies: Vec<WatchedItem>,
    pub shows: Vec<WatchedItem>,
    pub friends: BTreeSet<UserId>,
    pub created_at: String,
}

/// A pending request together with its sender's public view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestView {
    pub from: UserId,
    pub sender: SafeView,
    pub status: RequestStatus,
    pub sent_at: DateTime<Utc>,
}

/// The view of one user as seen by another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "visibility", rename_all = "lowercase")]
pub enum UserView {
    #[serde(rename = "self")]
    Own(ProfileView),
    Friend(FriendlyView),
    Public(SafeView),
}

pub fn to_profile_view(user: &UserRecord) -> ProfileView {
    ProfileView {
        id: user.id.clone(),
        display_name: user.display_name.clone(),
        email: user.email.clone(),
        avatar: user.avatar.clone(),
        movies: user.movies.clone(),
        shows: user.shows.clone(),
        friends: user.friends.clone(),
        requests: user.requests.clone(),
        created_at: format_human_readable(&user.created_at),
    }
}

pub fn to_safe_view(user: &UserRecord) -> SafeView {
    SafeView {
        id: user.id.clone(),
        display_name: user.display_name.clone(),
        avatar: user.avatar.clone(),
    }
}

pub fn to_friendly_view(user: &UserRecord) -> FriendlyView {
    FriendlyView {
        id: user.id.clone(),
        display_name: user.display_name.clone(),
        avatar: user.avatar.clone(),
        movies: user.movies.clone(),
        shows: user.shows.clone(),
        friends: user.friends.clone(),
        created_at: format_human_readable(&user.created_at),
    }
}

/// Pair `request` with its sender's public view.
pub fn to_pending_request_view(request: &FriendRequest, sender: &UserRecord) -> PendingRequestView {
    PendingRequestView {
        from: request.from.clone(),
        sender: to_safe_view(sender),
        status: request.status,
        sent_at: request.sent_at,
    }
}

/// Pick the projection of `target` that `viewer` is entitled to.
pub fn view_for(viewer: &UserRecord, target: &UserRecord) -> UserView {
    if viewer.id == target.id {
        UserView::Own(to_profile_view(target))
    } else if are_friends(viewer, target) {
        UserView::Friend(to_friendly_view(target))
    } else {
        UserView::Public(to_safe_view(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> UserRecord {
        let mut user = UserRecord::new(
            "u1",
            "Ana",
            Some("ana@example.com".into()),
            Utc.with_ymd_and_hms(2025, 10, 14, 9, 0, 0).unwrap(),
        );
        user.access_token = Some("at".into());
        user.refresh_token = Some("rt".into());
        user.add_friend("u2");
        user.push_request("u3", Utc.with_ymd_and_hms(2025, 10, 15, 9, 0, 0).unwrap());
        user
    }

    #[test]
    fn profile_view_keeps_everything_but_tokens() {
        let user = sample();
        let json = serde_json::to_value(to_profile_view(&user)).unwrap();

        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["requests"].as_array().unwrap().len(), 1);
        assert_eq!(json["friends"], serde_json::json!(["u2"]));
        assert_eq!(json["createdAt"], "14 de outubro de 2025");
        assert!(json.get("accessToken").is_none());
        assert!(json.get("refreshToken").is_none());
    }

    #[test]
    fn safe_view_exposes_identity_only() {
        let json = serde_json::to_value(to_safe_view(&sample())).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        for key in ["id", "displayName", "avatar"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn friendly_view_hides_email_and_requests() {
        let json = serde_json::to_value(to_friendly_view(&sample())).unwrap();
        assert!(json.get("email").is_none());
        assert!(json.get("requests").is_none());
        assert!(json.get("accessToken").is_none());
        assert_eq!(json["friends"], serde_json::json!(["u2"]));
        assert_eq!(json["createdAt"], "14 de outubro de 2025");
    }

    #[test]
    fn projections_leave_record_untouched() {
        let user = sample();
        let before = user.clone();
        let _ = to_profile_view(&user);
        let _ = to_safe_view(&user);
        let _ = to_friendly_view(&user);
        assert_eq!(user, before);
    }

    #[test]
    fn view_for_picks_visibility() {
        let ana = sample();
        let mut bea = UserRecord::new("u2", "Bea", None, Utc::now());
        let carl = UserRecord::new("u9", "Carl", None, Utc::now());
        bea.add_friend("u1");

        assert!(matches!(view_for(&ana, &ana), UserView::Own(_)));
        assert!(matches!(view_for(&bea, &ana), UserView::Friend(_)));
        assert!(matches!(view_for(&carl, &ana), UserView::Public(_)));

        let json = serde_json::to_value(view_for(&carl, &ana)).unwrap();
        assert_eq!(json["visibility"], "public");
        assert_eq!(json["displayName"], "Ana");
        let json = serde_json::to_value(view_for(&ana, &ana)).unwrap();
        assert_eq!(json["visibility"], "self");
    }
}
