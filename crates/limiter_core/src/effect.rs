#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Tear down the active detector: drop the locate attempt, the mutation
    /// subscription, the poll timer and the source handle.
    CancelDetection,
    /// Start searching for the chat source under the given epoch.
    BeginLocate { epoch: u64 },
    /// Subscribe to structural mutations of the held source.
    WatchMutations { epoch: u64 },
    /// Start the degraded polling timer.
    StartPolling { epoch: u64, interval_ms: u64 },
    /// Collect and evict down to `limit`. `forced` marks the
    /// failure-streak-triggered variant (logging only; same semantics).
    Trim { limit: usize, forced: bool },
}
