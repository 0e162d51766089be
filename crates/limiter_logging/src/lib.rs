#![deny(missing_docs)]
//! Shared logging utilities for the limiter workspace.
//!
//! This crate provides the `limiter_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the current settings epoch.
    ///
    /// The monitor bumps this on every restart (settings change or navigation)
    /// so log lines can be correlated with the configuration they ran under.
    static SETTINGS_EPOCH: Cell<u64> = const { Cell::new(0) };
}

/// Sets the settings epoch for the current thread.
/// The monitor calls this whenever it tears down and restarts detection.
pub fn set_settings_epoch(epoch: u64) {
    SETTINGS_EPOCH.with(|v| v.set(epoch));
}

/// Retrieves the settings epoch for the current thread.
/// Returns 0 if no epoch has been set.
pub fn settings_epoch() -> u64 {
    SETTINGS_EPOCH.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! limiter_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! limiter_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! limiter_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! limiter_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! limiter_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
