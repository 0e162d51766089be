/// Inclusive bounds the settings editor enforces for `max_retained`.
pub const MAX_RETAINED_BOUNDS: (u32, u32) = (10, 1_000);

/// Inclusive bounds the settings editor enforces for `poll_interval_ms`.
pub const POLL_INTERVAL_BOUNDS_MS: (u64, u64) = (500, 5_000);

/// User-editable monitor settings. Owned by the monitor state; replaced
/// wholesale on every update, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub enabled: bool,
    pub max_retained: u32,
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_retained: 100,
            poll_interval_ms: 1_000,
        }
    }
}

impl Settings {
    /// Returns a copy with both numeric fields forced into the editor bounds.
    ///
    /// The core itself accepts whatever it is handed (the invariant is
    /// enforced at the editing boundary); this helper is what that boundary
    /// uses before saving.
    pub fn clamped(self) -> Self {
        let (min_retained, max_retained) = MAX_RETAINED_BOUNDS;
        let (min_poll, max_poll) = POLL_INTERVAL_BOUNDS_MS;
        Self {
            enabled: self.enabled,
            max_retained: self.max_retained.clamp(min_retained, max_retained),
            poll_interval_ms: self.poll_interval_ms.clamp(min_poll, max_poll),
        }
    }

    /// Tick period for the degraded (cross-origin) polling strategy.
    ///
    /// Reduced visibility is countered by polling at twice the configured
    /// rate, floored at 500ms.
    pub fn degraded_poll_interval_ms(&self) -> u64 {
        (self.poll_interval_ms / 2).max(500)
    }
}
