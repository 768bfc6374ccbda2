//! Error types for the Moocho engine.

use thiserror::Error;

/// All possible errors from the Moocho engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("rating must be a number between {min} and {max}, got {value}")]
    InvalidRating { value: f64, min: f64, max: f64 },

    #[error("invalid TMDB id: {0:?}")]
    InvalidMediaId(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
