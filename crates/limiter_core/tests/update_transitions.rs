use std::sync::Once;

use limiter_core::{update, Effect, MonitorState, Msg, Phase, PollOutcome, Settings};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(limiter_logging::initialize_for_tests);
}

fn enabled_settings() -> Settings {
    Settings {
        enabled: true,
        max_retained: 100,
        poll_interval_ms: 1_000,
    }
}

fn apply(state: MonitorState, settings: Settings) -> (MonitorState, Vec<Effect>) {
    update(state, Msg::SettingsUpdated(settings))
}

/// Drives a fresh monitor to the Active phase.
fn active_state() -> MonitorState {
    let (state, _) = apply(MonitorState::new(), enabled_settings());
    let epoch = state.epoch();
    let (state, _) = update(
        state,
        Msg::LocateFinished {
            epoch,
            restricted: false,
        },
    );
    state
}

#[test]
fn enabling_starts_locating() {
    init_logging();
    let (state, effects) = apply(MonitorState::new(), enabled_settings());

    assert_eq!(state.phase(), Phase::Locating);
    assert_eq!(
        effects,
        vec![
            Effect::CancelDetection,
            Effect::BeginLocate {
                epoch: state.epoch()
            },
        ]
    );
}

#[test]
fn disabled_settings_go_idle_and_still_cancel() {
    init_logging();
    let (state, effects) = apply(MonitorState::new(), Settings::default());

    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(effects, vec![Effect::CancelDetection]);
}

#[test]
fn locate_success_enters_active_with_watch_and_initial_trim() {
    init_logging();
    let (state, _) = apply(MonitorState::new(), enabled_settings());
    let epoch = state.epoch();

    let (state, effects) = update(
        state,
        Msg::LocateFinished {
            epoch,
            restricted: false,
        },
    );

    assert_eq!(state.phase(), Phase::Active);
    assert_eq!(
        effects,
        vec![
            Effect::WatchMutations { epoch },
            Effect::Trim {
                limit: 100,
                forced: false
            },
        ]
    );
}

#[test]
fn cross_origin_locate_enters_degraded_with_halved_interval() {
    init_logging();
    let (state, _) = apply(MonitorState::new(), enabled_settings());
    let epoch = state.epoch();

    let (state, effects) = update(
        state,
        Msg::LocateFinished {
            epoch,
            restricted: true,
        },
    );

    assert_eq!(state.phase(), Phase::Degraded);
    assert_eq!(
        effects,
        vec![Effect::StartPolling {
            epoch,
            interval_ms: 500
        }]
    );
}

#[test]
fn degraded_interval_is_floored_at_500ms() {
    init_logging();
    let slow = Settings {
        poll_interval_ms: 5_000,
        ..enabled_settings()
    };
    let fast = Settings {
        poll_interval_ms: 600,
        ..enabled_settings()
    };
    assert_eq!(slow.degraded_poll_interval_ms(), 2_500);
    assert_eq!(fast.degraded_poll_interval_ms(), 500);
}

#[test]
fn stale_epoch_locate_result_is_ignored() {
    init_logging();
    let (state, _) = apply(MonitorState::new(), enabled_settings());
    let stale = state.epoch();
    // A settings update restarts under a fresh epoch before the old locate
    // attempt reports back.
    let (state, _) = apply(state, enabled_settings());
    assert!(state.epoch() > stale);

    let (state, effects) = update(
        state,
        Msg::LocateFinished {
            epoch: stale,
            restricted: false,
        },
    );

    assert_eq!(state.phase(), Phase::Locating);
    assert!(effects.is_empty());
}

#[test]
fn mutations_with_added_nodes_trigger_a_trim() {
    init_logging();
    let state = active_state();
    let epoch = state.epoch();

    let (_, effects) = update(state, Msg::MutationObserved { epoch, added: 3 });
    assert_eq!(
        effects,
        vec![Effect::Trim {
            limit: 100,
            forced: false
        }]
    );
}

#[test]
fn removal_echo_mutations_are_ignored() {
    init_logging();
    let state = active_state();
    let epoch = state.epoch();

    let (_, effects) = update(state, Msg::MutationObserved { epoch, added: 0 });
    assert!(effects.is_empty());
}

#[test]
fn poll_ticks_are_ignored_outside_degraded_phase() {
    init_logging();
    let state = active_state();
    let epoch = state.epoch();

    let (_, effects) = update(
        state,
        Msg::PollTick {
            epoch,
            outcome: PollOutcome::Counted(500),
            now_ms: 0,
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn navigation_discards_state_and_relocates() {
    init_logging();
    let state = active_state();
    let old_epoch = state.epoch();

    let (state, effects) = update(state, Msg::Navigated);

    assert_eq!(state.phase(), Phase::Locating);
    assert!(state.epoch() > old_epoch);
    assert_eq!(
        effects,
        vec![
            Effect::CancelDetection,
            Effect::BeginLocate {
                epoch: state.epoch()
            },
        ]
    );
}

#[test]
fn navigation_while_disabled_stays_idle() {
    init_logging();
    let (state, _) = apply(MonitorState::new(), Settings::default());
    let (state, effects) = update(state, Msg::Navigated);

    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(effects, vec![Effect::CancelDetection]);
}

#[test]
fn reapplying_identical_settings_still_restarts() {
    init_logging();
    let state = active_state();
    let old_epoch = state.epoch();

    let (state, effects) = apply(state, enabled_settings());

    assert_eq!(state.phase(), Phase::Locating);
    assert_eq!(state.epoch(), old_epoch + 1);
    assert_eq!(
        effects,
        vec![
            Effect::CancelDetection,
            Effect::BeginLocate {
                epoch: state.epoch()
            },
        ]
    );
}

#[test]
fn trim_results_accumulate_in_the_view() {
    init_logging();
    let state = active_state();
    let (state, _) = update(state, Msg::TrimFinished { removed: 50 });
    let (state, _) = update(state, Msg::TrimFinished { removed: 3 });

    assert_eq!(state.view().total_removed, 53);
}

#[test]
fn settings_clamp_respects_editor_bounds() {
    init_logging();
    let wild = Settings {
        enabled: true,
        max_retained: 1_000_000,
        poll_interval_ms: 1,
    };
    let clamped = wild.clamped();
    assert_eq!(clamped.max_retained, 1_000);
    assert_eq!(clamped.poll_interval_ms, 500);

    let low = Settings {
        enabled: false,
        max_retained: 3,
        poll_interval_ms: 9_999,
    };
    let clamped = low.clamped();
    assert_eq!(clamped.max_retained, 10);
    assert_eq!(clamped.poll_interval_ms, 5_000);
}
