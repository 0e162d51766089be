use crate::{Effect, MonitorState, Msg, Phase, TickAction};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: MonitorState, msg: Msg) -> (MonitorState, Vec<Effect>) {
    let effects = match msg {
        // Applying settings is idempotent by design: it always tears down the
        // current detector and restarts from scratch under a new epoch.
        Msg::SettingsLoaded(settings) | Msg::SettingsUpdated(settings) => {
            state.set_settings(settings);
            state.restart()
        }
        Msg::Navigated => {
            // The old nodes are stale even if still reachable; discard the
            // handle unconditionally, no grace period.
            state.restart()
        }
        Msg::LocateFinished { epoch, restricted } => {
            if epoch != state.epoch() || state.phase() != Phase::Locating {
                Vec::new()
            } else if restricted {
                state.enter_degraded();
                vec![Effect::StartPolling {
                    epoch,
                    interval_ms: state.settings().degraded_poll_interval_ms(),
                }]
            } else {
                state.enter_active();
                // One immediate trim: the chat may already exceed the limit
                // before the first mutation arrives.
                vec![
                    Effect::WatchMutations { epoch },
                    Effect::Trim {
                        limit: state.settings().max_retained as usize,
                        forced: false,
                    },
                ]
            }
        }
        Msg::MutationObserved { epoch, added } => {
            // Removal echoes (added == 0) are ignored so our own evictions
            // never feed back into the trigger.
            if epoch == state.epoch() && state.phase() == Phase::Active && added > 0 {
                vec![Effect::Trim {
                    limit: state.settings().max_retained as usize,
                    forced: false,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::PollTick {
            epoch,
            outcome,
            now_ms,
        } => {
            if epoch != state.epoch() || state.phase() != Phase::Degraded {
                Vec::new()
            } else {
                let limit = state.settings().max_retained as usize;
                match state.degraded_mut().note_tick(outcome, now_ms) {
                    TickAction::Skip => Vec::new(),
                    TickAction::Trim => vec![Effect::Trim {
                        limit,
                        forced: false,
                    }],
                    TickAction::ForcedTrim => vec![Effect::Trim {
                        limit,
                        forced: true,
                    }],
                }
            }
        }
        Msg::TrimFinished { removed } => {
            state.record_removed(removed);
            Vec::new()
        }
    };

    (state, effects)
}
