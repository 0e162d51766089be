use crate::{PollOutcome, Settings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Settings arrived from the store at startup.
    SettingsLoaded(Settings),
    /// Settings replaced via the inbound control message.
    SettingsUpdated(Settings),
    /// The hosting page replaced its content in place (single-page
    /// navigation); every cached handle is stale.
    Navigated,
    /// The locator finished: either a source handle is held by the runtime
    /// (`restricted == false`) or the embedded document is cross-origin.
    LocateFinished { epoch: u64, restricted: bool },
    /// The structural detector reported a mutation batch.
    MutationObserved { epoch: u64, added: usize },
    /// One degraded-mode polling tick completed.
    PollTick {
        epoch: u64,
        outcome: PollOutcome,
        now_ms: u64,
    },
    /// The runtime finished a trim pass.
    TrimFinished { removed: usize },
}
