//! Id allocation for the session backend.

/// Returns the id to give the next entry of a collection.
///
/// This is one more than the largest id currently in use or ever issued
/// (`last_issued`), so ids are never handed out twice even after the
/// newest entry is deleted. Returns `None` once `i32::MAX` has been issued.
/// Callers must hold the collection's write lock.
pub fn next_id<I>(ids: I, last_issued: i32) -> Option<i32>
where
    I: IntoIterator<Item = i32>,
{
    ids.into_iter().max().unwrap_or(0).max(last_issued).checked_add(1)
}
