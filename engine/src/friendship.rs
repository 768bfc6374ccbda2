//! Friendship predicate.

use crate::UserRecord;

/// Whether `a` and `b` are friends.
///
/// Either side listing the other is enough. An accepted request writes both
/// records in one commit, so a one-sided listing is never persisted by the
/// server; the tolerance only matters for records written elsewhere.
pub fn are_friends(a: &UserRecord, b: &UserRecord) -> bool {
    a.friends.contains(&b.id) || b.friends.contains(&a.id)
}
