//! Limiter core: pure state machine for the chat retention monitor.
mod degraded;
mod effect;
mod msg;
mod policy;
mod settings;
mod state;
mod update;
mod view_model;

pub use degraded::{
    DegradedTracker, PollOutcome, TickAction, FORCED_TRIM_COOLDOWN_MS,
    MAX_CONSECUTIVE_POLL_FAILURES,
};
pub use effect::Effect;
pub use msg::Msg;
pub use policy::eviction_count;
pub use settings::{Settings, MAX_RETAINED_BOUNDS, POLL_INTERVAL_BOUNDS_MS};
pub use state::{MonitorState, Phase};
pub use update::update;
pub use view_model::MonitorView;
