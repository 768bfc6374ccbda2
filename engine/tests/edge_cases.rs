//! Edge case tests for moocho-engine
//!
//! These tests cover boundary conditions and unusual inputs.

use chrono::{TimeZone, Utc};
use moocho_engine::{
    are_friends, calculate_average, format_human_readable, to_profile_view, view_for,
    FriendDecision, MediaKind, Rating, RatingSummary, RequestStatus, UserRecord, UserView,
    WatchedItem, MAX_RATING, MIN_RATING,
};
use proptest::prelude::*;

fn user(id: &str) -> UserRecord {
    UserRecord::new(
        id,
        format!("User {}", id),
        None,
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    )
}

// ============================================================================
// String Edge Cases
// ============================================================================

#[test]
fn unicode_display_names_survive_storage() {
    let names = vec![
        "日本語テスト",
        "Привет мир",
        "مرحبا بالعالم",
        "🎉🚀💯",
        "João Conceição",
        "Hello\nWorld\tTab",
    ];

    for (i, name) in names.iter().enumerate() {
        let record = UserRecord::new(
            format!("u{}", i),
            *name,
            None,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        );
        let raw = serde_json::to_string(&record).unwrap();
        let back: UserRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.display_name, *name, "Failed for: {}", name);
        assert_eq!(to_profile_view(&back).display_name, *name);
    }
}

#[test]
fn ids_with_special_characters() {
    let ids = ["google-oauth2|1234", "auth0:abc", "user with spaces", "ü:ñ"];
    let mut me = user("me");
    for id in ids {
        assert!(me.add_friend(id), "Failed for: {}", id);
    }
    assert_eq!(me.friends.len(), ids.len());
    for id in ids {
        assert!(me.friends.contains(id));
    }
}

// ============================================================================
// Record Compatibility
// ============================================================================

#[test]
fn minimal_stored_record_gets_defaults() {
    let raw = r#"{
        "id": "legacy",
        "displayName": "Old Timer",
        "email": null,
        "createdAt": "2024-03-01T12:00:00Z"
    }"#;
    let record: UserRecord = serde_json::from_str(raw).unwrap();

    assert!(record.friends.is_empty());
    assert!(record.requests.is_empty());
    assert!(record.movies.is_empty());
    assert_eq!(record.pending_count(), 0);
}

#[test]
fn out_of_range_stored_rating_is_rejected() {
    let raw = r#"{"tmdbId": "550", "rating": 12, "watchedAt": "2024-03-01T12:00:00Z"}"#;
    assert!(serde_json::from_str::<WatchedItem>(raw).is_err());
}

#[test]
fn friend_set_serializes_in_order() {
    let mut me = user("me");
    me.add_friend("zed");
    me.add_friend("amy");
    me.add_friend("kim");

    let json = serde_json::to_value(&me).unwrap();
    assert_eq!(json["friends"], serde_json::json!(["amy", "kim", "zed"]));
}

// ============================================================================
// Friendship Edge Cases
// ============================================================================

#[test]
fn one_sided_friendship_counts_both_ways() {
    let mut a = user("a");
    let b = user("b");
    a.add_friend("b");

    assert!(are_friends(&a, &b));
    assert!(are_friends(&b, &a));
    assert!(matches!(view_for(&b, &a), UserView::Friend(_)));
}

#[test]
fn resolving_twice_only_succeeds_once() {
    let mut me = user("me");
    me.push_request("a", Utc::now());

    assert!(me.resolve_request("a", FriendDecision::Accepted));
    assert!(!me.resolve_request("a", FriendDecision::Rejected));
    assert_eq!(me.requests[0].status, RequestStatus::Accepted);
}

#[test]
fn many_pending_requests() {
    let mut me = user("me");
    for i in 0..500 {
        me.push_request(&format!("s{}", i), Utc::now());
    }
    me.resolve_request("s10", FriendDecision::Rejected);

    assert_eq!(me.pending_count(), 499);
    assert!(me.pending_request_from("s10").is_none());
    assert!(me.pending_request_from("s499").is_some());
}

#[test]
fn rewatching_replaces_entry() {
    let mut me = user("me");
    let first = WatchedItem {
        tmdb_id: "550".into(),
        rating: None,
        watched_at: Utc::now(),
    };
    let second = WatchedItem {
        rating: Some(Rating::new(9.0).unwrap()),
        ..first.clone()
    };

    me.record_watched(MediaKind::Movie, first);
    me.record_watched(MediaKind::Movie, second.clone());

    assert_eq!(me.watched(MediaKind::Movie), &[second]);
    assert!(me.watched(MediaKind::Show).is_empty());
}

// ============================================================================
// Dates
// ============================================================================

#[test]
fn leap_day_and_year_end() {
    let leap = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
    let end = Utc.with_ymd_and_hms(1999, 12, 31, 0, 0, 0).unwrap();
    assert_eq!(format_human_readable(&leap), "29 de fevereiro de 2024");
    assert_eq!(format_human_readable(&end), "31 de dezembro de 1999");
}

// ============================================================================
// Aggregation Properties
// ============================================================================

fn ratings() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(MIN_RATING..=MAX_RATING, 1..64)
}

proptest! {
    #[test]
    fn average_stays_within_rating_range(values in ratings()) {
        let average = calculate_average(&values).unwrap();
        prop_assert!(average >= MIN_RATING && average <= MAX_RATING);
    }

    #[test]
    fn average_stays_between_extremes(values in ratings()) {
        let average = calculate_average(&values).unwrap();
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(average >= lo - 0.005 && average <= hi + 0.005);
    }

    #[test]
    fn average_has_at_most_two_decimals(values in ratings()) {
        let average = calculate_average(&values).unwrap();
        prop_assert!((average * 100.0 - (average * 100.0).round()).abs() < 1e-6);
    }

    #[test]
    fn summary_counts_every_rating(values in ratings()) {
        let summary = RatingSummary::recompute("550", &values).unwrap();
        prop_assert_eq!(summary.ratings_count, values.len());
        prop_assert_eq!(Some(summary.average_rating), calculate_average(&values));
    }

    #[test]
    fn ratings_outside_range_never_validate(value in prop_oneof![
        -1000.0f64..MIN_RATING,
        (MAX_RATING + f64::EPSILON * 16.0)..1000.0f64,
    ]) {
        prop_assert!(Rating::new(value).is_err());
    }

    #[test]
    fn add_friend_never_lists_self(id in "[a-z0-9]{1,12}", others in prop::collection::vec("[a-z0-9]{1,12}", 0..16)) {
        let mut me = user(&id);
        me.add_friend(&id);
        for other in &others {
            me.add_friend(other);
        }
        prop_assert!(!me.friends.contains(&id));
    }
}
