use limiter_core::eviction_count;
use limiter_logging::{limiter_debug, limiter_info};

use crate::dom::{ChatDocument, NodeKey};

/// Removes the oldest excess items so that at most `limit` remain.
///
/// Each removal is attempted independently: the widget mutates its own DOM
/// concurrently (virtualization, its own pruning), so a target may already
/// be gone. Such failures are logged and skipped; partial success is
/// expected. Returns the number of items actually removed.
pub fn trim(document: &dyn ChatDocument, items: &[NodeKey], limit: usize) -> usize {
    let excess = eviction_count(items.len(), limit);
    if excess == 0 {
        return 0;
    }

    let mut removed = 0;
    for key in &items[..excess] {
        match document.remove(*key) {
            Ok(()) => removed += 1,
            Err(err) => {
                limiter_debug!("skipped removal of {key:?}: {err}");
            }
        }
    }

    limiter_info!("removed {removed} of {excess} excess chat messages");
    removed
}
