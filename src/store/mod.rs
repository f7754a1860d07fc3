//! Durable loan application store
//!
//! One JSON file holds the entire record set. `RecordStore` is the only
//! component that reads or writes it; every mutation is a full
//! load → validate → mutate → atomic commit cycle under a single writer guard
//! that spans threads, store handles and processes.

mod durable;
mod errors;
mod index;
mod record_store;

pub use durable::{DataFile, WriterLock};
pub use errors::{StoreError, StoreResult};
pub use index::ApplicationIndex;
pub use record_store::RecordStore;

/// Default data file name
pub const DEFAULT_DATA_FILE_NAME: &str = "loanApplication.json";
