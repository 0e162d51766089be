use crate::view_model::MonitorView;
use crate::{DegradedTracker, Effect, Settings};

/// Monitor lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Disabled, or settings not applied yet.
    #[default]
    Idle,
    /// Enabled, searching for a chat source.
    Locating,
    /// Source handle held, structural detector running.
    Active,
    /// Source is cross-origin restricted, polling strategy running.
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonitorState {
    settings: Settings,
    phase: Phase,
    epoch: u64,
    degraded: DegradedTracker,
    total_removed: u64,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current settings epoch. Detector messages stamped with an older epoch
    /// belong to a torn-down detector and are ignored.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn view(&self) -> MonitorView {
        MonitorView {
            phase: self.phase,
            enabled: self.settings.enabled,
            max_retained: self.settings.max_retained,
            poll_interval_ms: self.settings.poll_interval_ms,
            total_removed: self.total_removed,
            last_poll_count: self.degraded.last_count(),
            consecutive_poll_failures: self.degraded.consecutive_failures(),
        }
    }

    pub(crate) fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub(crate) fn degraded_mut(&mut self) -> &mut DegradedTracker {
        &mut self.degraded
    }

    pub(crate) fn record_removed(&mut self, removed: usize) {
        self.total_removed += removed as u64;
    }

    pub(crate) fn enter_active(&mut self) {
        self.phase = Phase::Active;
    }

    pub(crate) fn enter_degraded(&mut self) {
        self.phase = Phase::Degraded;
    }

    /// Full restart: new epoch, fresh degraded accounting, and the phase
    /// dictated by the `enabled` flag. Returns the effects realizing it.
    pub(crate) fn restart(&mut self) -> Vec<Effect> {
        self.epoch += 1;
        self.degraded = DegradedTracker::new();
        if self.settings.enabled {
            self.phase = Phase::Locating;
            vec![
                Effect::CancelDetection,
                Effect::BeginLocate { epoch: self.epoch },
            ]
        } else {
            self.phase = Phase::Idle;
            vec![Effect::CancelDetection]
        }
    }
}
