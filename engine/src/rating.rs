//! Ratings and rating summaries.

use crate::aggregate::calculate_average;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest accepted rating.
pub const MIN_RATING: f64 = 1.0;

/// Highest accepted rating.
pub const MAX_RATING: f64 = 10.0;

/// A user's rating of a title, always within `[MIN_RATING, MAX_RATING]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    /// Validate a raw rating. Non-finite values and values outside the
    /// inclusive range are rejected.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidRating {
                value,
                min: MIN_RATING,
                max: MAX_RATING,
            })
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Rating {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Check that `id` looks like a TMDB id (non-empty, ASCII digits only).
pub fn validate_media_id(id: &str) -> Result<&str> {
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(id)
    } else {
        Err(Error::InvalidMediaId(id.to_string()))
    }
}

/// Average and count of every current rating for a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub movie_id: String,
    /// Mean of all ratings, rounded to two decimals
    pub average_rating: f64,
    /// Number of distinct raters
    pub ratings_count: usize,
}

impl RatingSummary {
    /// Recompute the summary from the full set of per-user ratings.
    ///
    /// Returns `None` when there are no ratings, since an unrated movie has
    /// no summary.
    pub fn recompute(movie_id: impl Into<String>, ratings: &[f64]) -> Option<Self> {
        let average_rating = calculate_average(ratings)?;
        Some(Self {
            movie_id: movie_id.into(),
            average_rating,
            ratings_count: ratings.len(),
        })
    }
}

/// One friend's rating of a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRating {
    pub friend_id: String,
    pub rating: f64,
}

/// How a user's friends rated a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendsRatings {
    pub movie_id: String,
    /// Friends who have rated the movie
    pub friends_watched: usize,
    pub ratings: Vec<FriendRating>,
    /// `None` when no friend has rated it
    pub average: Option<f64>,
}

impl FriendsRatings {
    pub fn new(movie_id: impl Into<String>, ratings: Vec<FriendRating>) -> Self {
        let values: Vec<f64> = ratings.iter().map(|r| r.rating).collect();
        Self {
            movie_id: movie_id.into(),
            friends_watched: ratings.len(),
            average: calculate_average(&values),
            ratings,
        }
    }

    pub fn empty(movie_id: impl Into<String>) -> Self {
        Self::new(movie_id, Vec::new())
    }
}
