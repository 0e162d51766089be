/// Consecutive failed ticks tolerated before a trim is forced.
pub const MAX_CONSECUTIVE_POLL_FAILURES: u32 = 5;

/// Minimum spacing between forced trims.
pub const FORCED_TRIM_COOLDOWN_MS: u64 = 5_000;

/// What a single degraded-mode polling tick managed to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Direct access succeeded and the messages were counted.
    Counted(usize),
    /// Direct access failed; the count is a geometric estimate (0 when no
    /// geometry was available either).
    Estimated(usize),
    /// The chat frame could not be found at all this tick.
    Unavailable,
}

/// Decision for one degraded-mode tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Nothing changed; do not touch the page.
    Skip,
    /// The observed count changed since the previous tick.
    Trim,
    /// Too many consecutive failed ticks; trim regardless of the count delta.
    ForcedTrim,
}

/// Per-epoch accounting for the polling strategy.
///
/// A tick that could not count directly is a failed tick, because repeated
/// access failures may mask real growth. After more than
/// [`MAX_CONSECUTIVE_POLL_FAILURES`] failures in a row a trim is forced, at
/// most once per [`FORCED_TRIM_COOLDOWN_MS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DegradedTracker {
    last_count: Option<usize>,
    consecutive_failures: u32,
    last_forced_trim_ms: Option<u64>,
}

impl DegradedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent count or estimate observed, if any tick produced one.
    pub fn last_count(&self) -> Option<usize> {
        self.last_count
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Records one tick and decides whether it should trigger a trim.
    ///
    /// `now_ms` is a monotonic timestamp supplied by the caller; the tracker
    /// itself never reads a clock.
    pub fn note_tick(&mut self, outcome: PollOutcome, now_ms: u64) -> TickAction {
        let observed = match outcome {
            PollOutcome::Counted(n) => {
                self.consecutive_failures = 0;
                Some(n)
            }
            PollOutcome::Estimated(n) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                Some(n)
            }
            PollOutcome::Unavailable => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                None
            }
        };

        if let Some(count) = observed {
            if self.last_count != Some(count) {
                self.last_count = Some(count);
                return TickAction::Trim;
            }
        }

        if self.consecutive_failures > MAX_CONSECUTIVE_POLL_FAILURES {
            let cooled_down = self
                .last_forced_trim_ms
                .is_none_or(|t| now_ms.saturating_sub(t) >= FORCED_TRIM_COOLDOWN_MS);
            if cooled_down {
                self.last_forced_trim_ms = Some(now_ms);
                return TickAction::ForcedTrim;
            }
        }

        TickAction::Skip
    }
}
