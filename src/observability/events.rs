//! Observable events for loandesk
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Process startup begins
    BootStart,
    /// Store opened and HTTP surface ready
    BootComplete,
    /// Configuration loaded
    ConfigLoaded,
    /// HTTP listener bound
    HttpListening,

    // Store
    /// Store opened and data file verified
    StoreOpened,
    /// Temporary files from an interrupted commit removed
    StoreTempCleaned,
    /// Full record set committed to disk
    StoreCommit,
    /// Commit failed; durable file untouched
    StoreCommitFailed,
    /// Data file could not be parsed
    StoreCorruption,
    /// Loaded set holds more than one record for a key
    StoreDuplicateKeys,
    /// Directory fsync after a commit failed; the rename may not survive power loss
    StoreDirSyncFailed,

    // Record operations
    /// Application created
    ApplicationCreated,
    /// Application updated
    ApplicationUpdated,
    /// Application deleted
    ApplicationDeleted,
    /// Operation rejected (validation, duplicate, unknown key)
    ApplicationRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::BootComplete => "BOOT_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::HttpListening => "HTTP_LISTENING",

            Event::StoreOpened => "STORE_OPENED",
            Event::StoreTempCleaned => "STORE_TEMP_CLEANED",
            Event::StoreCommit => "STORE_COMMIT",
            Event::StoreCommitFailed => "STORE_COMMIT_FAILED",
            Event::StoreCorruption => "STORE_CORRUPTION",
            Event::StoreDuplicateKeys => "STORE_DUPLICATE_KEYS",
            Event::StoreDirSyncFailed => "STORE_DIR_SYNC_FAILED",

            Event::ApplicationCreated => "APPLICATION_CREATED",
            Event::ApplicationUpdated => "APPLICATION_UPDATED",
            Event::ApplicationDeleted => "APPLICATION_DELETED",
            Event::ApplicationRejected => "APPLICATION_REJECTED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StoreCorruption)
    }

    /// Returns true if this event reports a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::StoreCommitFailed)
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        if self.is_fatal() {
            Severity::Fatal
        } else if self.is_failure() {
            Severity::Error
        } else if matches!(
            self,
            Event::ApplicationRejected
                | Event::StoreTempCleaned
                | Event::StoreDuplicateKeys
                | Event::StoreDirSyncFailed
        ) {
            Severity::Warn
        } else {
            Severity::Info
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
