/// Number of oldest items to evict so that at most `limit` remain.
///
/// Pure counting; repeated calls with the same inputs return the same answer.
pub fn eviction_count(current: usize, limit: usize) -> usize {
    current.saturating_sub(limit)
}
