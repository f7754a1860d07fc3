//! Crash point injection for durability testing
//!
//! Setting `LOANDESK_CRASH_POINT=<name>` makes the process terminate
//! immediately via `std::process::abort()` when execution reaches the named
//! point: no cleanup, no unwinding, no catching.
//!
//! # Usage
//!
//! ```ignore
//! use loandesk::crash_point::{maybe_crash, points};
//!
//! maybe_crash(points::STORE_BEFORE_RENAME);
//! ```
//!
//! ```bash
//! LOANDESK_CRASH_POINT=store_before_rename loandesk create --config loandesk.json < app.json
//! ```

use std::sync::OnceLock;

/// Environment variable naming the active crash point
pub const CRASH_POINT_ENV: &str = "LOANDESK_CRASH_POINT";

static CRASH_POINT: OnceLock<Option<String>> = OnceLock::new();

#[inline]
fn get_crash_point() -> Option<&'static str> {
    CRASH_POINT
        .get_or_init(|| std::env::var(CRASH_POINT_ENV).ok())
        .as_deref()
}

/// Check if a specific crash point is enabled
#[inline]
pub fn crash_point_enabled(name: &str) -> bool {
    get_crash_point().map(|p| p == name).unwrap_or(false)
}

/// Abort the process if the named crash point is enabled.
///
/// No-op when `LOANDESK_CRASH_POINT` is unset or names another point.
#[inline]
pub fn maybe_crash(name: &str) {
    if crash_point_enabled(name) {
        eprintln!("[CRASH] Triggering crash at point: {}", name);
        std::process::abort();
    }
}

/// All defined crash point names
pub mod points {
    /// Commit started, nothing written yet
    pub const STORE_BEFORE_TEMP_WRITE: &str = "store_before_temp_write";
    /// Temporary file written, not yet fsynced
    pub const STORE_AFTER_TEMP_WRITE: &str = "store_after_temp_write";
    /// Immediately before the rename over the data file
    pub const STORE_BEFORE_RENAME: &str = "store_before_rename";
    /// Rename done, directory not yet fsynced
    pub const STORE_AFTER_RENAME: &str = "store_after_rename";

    /// Get all crash point names
    pub fn all() -> &'static [&'static str] {
        &[
            STORE_BEFORE_TEMP_WRITE,
            STORE_AFTER_TEMP_WRITE,
            STORE_BEFORE_RENAME,
            STORE_AFTER_RENAME,
        ]
    }
}
