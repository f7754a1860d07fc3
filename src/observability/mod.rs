//! Observability subsystem for loandesk
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Store counters
//!
//! Observability is read-only: nothing here affects store behavior.
//!
//! # Usage
//!
//! ```ignore
//! use loandesk::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::StoreCommit, &[("records", "3")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, StoreMetrics};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
