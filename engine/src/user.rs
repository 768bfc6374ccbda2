//! User records and the items stored inside them.

use crate::{Rating, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const AVATAR_COLORS: [&str; 6] = [
    "#F4A261", "#2A9D8F", "#E76F51", "#264653", "#E9C46A", "#8AB17D",
];

const AVATAR_MASCOTS: [&str; 4] = ["popcorn", "clapper", "reel", "ticket"];

/// Avatar shown next to a user's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub background_color: String,
    pub mascot: String,
}

impl Avatar {
    /// Deterministic default avatar for a new user.
    pub fn for_user(id: &str) -> Self {
        let seed = id.bytes().fold(0usize, |acc, b| {
            acc.wrapping_mul(31).wrapping_add(usize::from(b))
        });
        Self {
            background_color: AVATAR_COLORS[seed % AVATAR_COLORS.len()].to_string(),
            mascot: AVATAR_MASCOTS[seed % AVATAR_MASCOTS.len()].to_string(),
        }
    }
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            background_color: AVATAR_COLORS[0].to_string(),
            mascot: AVATAR_MASCOTS[0].to_string(),
        }
    }
}

/// Which watch list an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Show,
}

/// A movie or show the user has watched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedItem {
    pub tmdb_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    pub watched_at: DateTime<Utc>,
}

/// State of a friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

/// The receiver's answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendDecision {
    Accepted,
    Rejected,
}

impl From<FriendDecision> for RequestStatus {
    fn from(decision: FriendDecision) -> Self {
        match decision {
            FriendDecision::Accepted => RequestStatus::Accepted,
            FriendDecision::Rejected => RequestStatus::Rejected,
        }
    }
}

/// A friend request, stored on the receiver's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    /// Sender's user id
    pub from: UserId,
    pub status: RequestStatus,
    pub sent_at: DateTime<Utc>,
}

impl FriendRequest {
    /// A new pending request from `from`.
    pub fn pending(from: impl Into<UserId>, sent_at: DateTime<Utc>) -> Self {
        Self {
            from: from.into(),
            status: RequestStatus::Pending,
            sent_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// The full, persisted user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Opaque id assigned by the identity provider
    pub id: UserId,
    pub display_name: String,
    pub email: Option<String>,
    /// Identity provider token, kept as an inert memo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Identity provider token, kept as an inert memo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub movies: Vec<WatchedItem>,
    #[serde(default)]
    pub shows: Vec<WatchedItem>,
    /// Ids of accepted friends; never contains `id` itself
    #[serde(default)]
    pub friends: BTreeSet<UserId>,
    /// Incoming friend requests, oldest first
    #[serde(default)]
    pub requests: Vec<FriendRequest>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub avatar: Avatar,
}

impl UserRecord {
    /// Create an empty record for a first-time user.
    pub fn new(
        id: impl Into<UserId>,
        display_name: impl Into<String>,
        email: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let id = id.into();
        let avatar = Avatar::for_user(&id);
        Self {
            id,
            display_name: display_name.into(),
            email,
            access_token: None,
            refresh_token: None,
            movies: Vec::new(),
            shows: Vec::new(),
            friends: BTreeSet::new(),
            requests: Vec::new(),
            created_at,
            avatar,
        }
    }

    /// Add `id` to the friend set.
    ///
    /// Returns `false` if it was already there or is this record's own id.
    pub fn add_friend(&mut self, id: &str) -> bool {
        if id == self.id {
            return false;
        }
        self.friends.insert(id.to_string())
    }

    /// All requests still awaiting a decision.
    pub fn pending_requests(&self) -> impl Iterator<Item = &FriendRequest> {
        self.requests.iter().filter(|r| r.is_pending())
    }

    pub fn pending_count(&self) -> usize {
        self.pending_requests().count()
    }

    /// The pending request from `sender`, if any.
    pub fn pending_request_from(&self, sender: &str) -> Option<&FriendRequest> {
        self.pending_requests().find(|r| r.from == sender)
    }

    /// Append a pending request from `sender`.
    pub fn push_request(&mut self, sender: &str, sent_at: DateTime<Utc>) {
        self.requests.push(FriendRequest::pending(sender, sent_at));
    }

    /// Resolve the pending request from `sender` with `decision`.
    ///
    /// Returns `false` if there is no such pending request.
    pub fn resolve_request(&mut self, sender: &str, decision: FriendDecision) -> bool {
        match self
            .requests
            .iter_mut()
            .find(|r| r.is_pending() && r.from == sender)
        {
            Some(request) => {
                request.status = decision.into();
                true
            }
            None => false,
        }
    }

    pub fn watched(&self, kind: MediaKind) -> &[WatchedItem] {
        match kind {
            MediaKind::Movie => &self.movies,
            MediaKind::Show => &self.shows,
        }
    }

    /// Insert or replace the entry for `item.tmdb_id` in the `kind` list.
    ///
    /// An existing entry keeps its position.
    pub fn record_watched(&mut self, kind: MediaKind, item: WatchedItem) {
        let list = match kind {
            MediaKind::Movie => &mut self.movies,
            MediaKind::Show => &mut self.shows,
        };
        match list.iter_mut().find(|w| w.tmdb_id == item.tmdb_id) {
            Some(existing) => *existing = item,
            None => list.push(item),
        }
    }
}
