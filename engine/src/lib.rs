//! # Moocho Engine
//!
//! Domain logic for the Moocho API: user records, friend requests, ratings
//! and the read models derived from them.
//!
//! This crate does no I/O. The server reads records from the key-value
//! store, hands them to the functions here, and writes the results back
//! under its optimistic-concurrency protocol.
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`UserRecord`] holds a user's profile, watch lists ([`WatchedItem`]),
//! friend set and incoming [`FriendRequest`]s. Friend sets never contain the
//! owner's id, and at most one pending request per sender is kept.
//!
//! ### Ratings
//!
//! A [`Rating`] is a validated number in `[1, 10]`. A [`RatingSummary`] is
//! always recomputed from every current rating of a movie with
//! [`calculate_average`].
//!
//! ### Views
//!
//! [`to_profile_view`], [`to_friendly_view`] and [`to_safe_view`] derive the
//! self, friend and public read models; [`view_for`] picks one using
//! [`are_friends`].
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use moocho_engine::{are_friends, to_safe_view, FriendDecision, UserRecord};
//!
//! let mut ana = UserRecord::new("ana", "Ana", None, Utc::now());
//! let mut bea = UserRecord::new("bea", "Bea", None, Utc::now());
//!
//! ana.push_request("bea", Utc::now());
//! assert!(ana.resolve_request("bea", FriendDecision::Accepted));
//! ana.add_friend("bea");
//! bea.add_friend("ana");
//!
//! assert!(are_friends(&ana, &bea));
//! assert_eq!(to_safe_view(&bea).display_name, "Bea");
//! ```

pub mod aggregate;
pub mod date;
pub mod error;
pub mod friendship;
pub mod rating;
pub mod user;
pub mod view;

// Re-export main types at crate root
pub use aggregate::calculate_average;
pub use date::format_human_readable;
pub use error::Error;
pub use friendship::are_friends;
pub use rating::{
    validate_media_id, FriendRating, FriendsRatings, Rating, RatingSummary, MAX_RATING,
    MIN_RATING,
};
pub use user::{
    Avatar, FriendDecision, FriendRequest, MediaKind, RequestStatus, UserRecord, WatchedItem,
};
pub use view::{
    to_friendly_view, to_pending_request_view, to_profile_view, to_safe_view, view_for,
    FriendlyView, PendingRequestView, ProfileView, SafeView, UserView,
};

/// Opaque user id issued by the identity provider.
pub type UserId = String;
