use std::collections::HashSet;

use limiter_logging::limiter_debug;

use crate::dom::{NodeKey, SourceHandle};
use crate::selectors::SelectorConfig;

/// Collects every current chat message under the source container, oldest
/// first.
///
/// Results of the per-kind selector queries are unioned and deduplicated by
/// node identity (one element may match several selectors), then sorted by
/// document position: iteration order across separate queries carries no
/// ordering guarantee, and the eviction policy must see the genuinely oldest
/// items at the front. Any access failure yields an empty sequence for this
/// call; the next trigger simply retries.
pub fn collect(source: &SourceHandle, config: &SelectorConfig) -> Vec<NodeKey> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for (kind, selector) in &config.message_selectors {
        let matches = match source.document.query_all(source.container, selector) {
            Ok(matches) => matches,
            Err(err) => {
                limiter_debug!("collection aborted on {kind:?} selector `{selector}`: {err}");
                return Vec::new();
            }
        };
        for key in matches {
            if seen.insert(key) {
                items.push(key);
            }
        }
    }

    // Items detached mid-collection have no position; they sort last and
    // fail removal harmlessly.
    items.sort_by_key(|key| source.document.position(*key).unwrap_or(u64::MAX));
    limiter_debug!("collected {} chat messages", items.len());
    items
}
