use crate::Phase;

/// Read-only snapshot of the monitor for status display and tests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonitorView {
    pub phase: Phase,
    pub enabled: bool,
    pub max_retained: u32,
    pub poll_interval_ms: u64,
    pub total_removed: u64,
    pub last_poll_count: Option<usize>,
    pub consecutive_poll_failures: u32,
}
