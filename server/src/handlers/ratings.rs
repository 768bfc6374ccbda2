//! Movie ratings and their summaries.

use crate::error::{AppError, Result};
use crate::handlers::require_user;
use crate::store::{keys, RecordStore};
use moocho_engine::{
    validate_media_id, FriendRating, FriendsRatings, Rating, RatingSummary,
};

fn parse_stored_rating(key: &str, field: &str, raw: &str) -> Result<f64> {
    raw.parse().map_err(|_| {
        AppError::Internal(format!(
            "unparseable rating {:?} for {} at {}",
            raw, field, key
        ))
    })
}

/// Store `user_id`'s rating of `movie_id` and recompute the movie summary.
///
/// Only users with a stored record may rate; anyone else is `NotFound`.
///
/// The rating itself is a single hash field write, so it needs no watch.
/// The summary is rebuilt from every stored rating and written last; under
/// concurrent raters it may briefly trail the ratings until the next write.
pub async fn submit_rating(
    store: &dyn RecordStore,
    user_id: &str,
    movie_id: &str,
    rating: f64,
) -> Result<RatingSummary> {
    let movie_id = validate_media_id(movie_id)?;
    let rating = Rating::new(rating)?;
    require_user(store, user_id).await?;

    let ratings_key = keys::movie_ratings(movie_id);
    store
        .hash_set(&ratings_key, user_id, &rating.to_string())
        .await?;

    let all = store.hash_get_all(&ratings_key).await?;
    let values = all
        .iter()
        .map(|(field, raw)| parse_stored_rating(&ratings_key, field, raw))
        .collect::<Result<Vec<_>>>()?;

    let summary = RatingSummary::recompute(movie_id, &values).ok_or_else(|| {
        AppError::Internal(format!("no ratings found at {} after write", ratings_key))
    })?;

    store
        .set(
            &keys::movie_summary(movie_id),
            &serde_json::to_string(&summary)?,
        )
        .await?;

    tracing::debug!(
        movie_id,
        user_id,
        average = summary.average_rating,
        count = summary.ratings_count,
        "Rating summary recomputed"
    );
    Ok(summary)
}

/// The stored summary for `movie_id`.
pub async fn get_summary(store: &dyn RecordStore, movie_id: &str) -> Result<RatingSummary> {
    let movie_id = validate_media_id(movie_id)?;
    let raw = store
        .get(&keys::movie_summary(movie_id))
        .await?
        .ok_or_else(|| AppError::NotFound("This movie hasn't been rated yet".to_string()))?;
    Ok(serde_json::from_str(&raw)?)
}

/// How `user_id`'s friends rated `movie_id`, fetched in one multi-field read.
pub async fn get_friends_ratings(
    store: &dyn RecordStore,
    user_id: &str,
    movie_id: &str,
) -> Result<FriendsRatings> {
    let movie_id = validate_media_id(movie_id)?;
    let user = require_user(store, user_id).await?;

    if user.friends.is_empty() {
        return Ok(FriendsRatings::empty(movie_id));
    }

    let friend_ids: Vec<String> = user.friends.into_iter().collect();
    let ratings_key = keys::movie_ratings(movie_id);
    let values = store.multi_get(&ratings_key, &friend_ids).await?;

    let ratings = friend_ids
        .into_iter()
        .zip(values)
        .filter_map(|(friend_id, raw)| raw.map(|raw| (friend_id, raw)))
        .map(|(friend_id, raw)| {
            let rating = parse_stored_rating(&ratings_key, &friend_id, &raw)?;
            Ok(FriendRating { friend_id, rating })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FriendsRatings::new(movie_id, ratings))
}
