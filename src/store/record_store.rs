//! Record store
//!
//! Each mutation runs one full cycle under the writer guard:
//! load the set, validate, mutate, commit the whole set atomically.
//! The guard is an in-process mutex plus the data file's cross-process
//! lock, so separate handles and separate processes serialize too.
//! Reads skip the guard: the data file is only ever replaced by rename, so a
//! reader sees either the old set or the new one.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::application::{validate, ApplicationInput, LoanApplication};
use crate::application::validation::is_blank;
use crate::observability::{log_event_with_fields, Event, StoreMetrics};

use super::durable::DataFile;
use super::errors::{StoreError, StoreResult};
use super::index::ApplicationIndex;

/// The sole reader and writer of one loan application data file.
#[derive(Debug)]
pub struct RecordStore {
    file: DataFile,
    writer: Mutex<()>,
    metrics: Arc<StoreMetrics>,
}

impl RecordStore {
    /// Open the store backed by `path`.
    ///
    /// Creates the parent directory, removes temp files left by interrupted
    /// commits and loads the set once so a corrupt file fails here, at
    /// startup, rather than on the first request.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self {
            file: DataFile::new(path),
            writer: Mutex::new(()),
            metrics: Arc::new(StoreMetrics::new()),
        };

        store.file.ensure_dir()?;

        let removed = {
            let _lock = store.file.lock()?;
            store.file.remove_stale_temp_files()?
        };
        if removed > 0 {
            log_event_with_fields(
                Event::StoreTempCleaned,
                &[("removed", &removed.to_string()), ("path", &store.path_str())],
            );
        }

        let index = store.load_index()?;
        let duplicates = index.duplicate_keys();
        if !duplicates.is_empty() {
            log_event_with_fields(
                Event::StoreDuplicateKeys,
                &[
                    ("duplicate_keys", &duplicates.join(",")),
                    ("path", &store.path_str()),
                ],
            );
        }

        log_event_with_fields(
            Event::StoreOpened,
            &[("path", &store.path_str()), ("records", &index.len().to_string())],
        );

        Ok(store)
    }

    /// Path of the backing data file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn path_str(&self) -> String {
        self.file.path().display().to_string()
    }

    /// Shared handle to this store's counters
    pub fn metrics(&self) -> Arc<StoreMetrics> {
        Arc::clone(&self.metrics)
    }

    /// All records in file order.
    pub fn list_all(&self) -> StoreResult<Vec<LoanApplication>> {
        Ok(self.load_index()?.into_records())
    }

    /// The first record with this application number.
    pub fn get(&self, application_number: &str) -> StoreResult<LoanApplication> {
        let result = Self::require_key(application_number).and_then(|_| {
            self.load_index()?
                .get(application_number)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(application_number.to_string()))
        });
        self.observe("get", application_number, result)
    }

    /// Number of stored records
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.load_index()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Create a new application. The store assigns `dateApplied`.
    pub fn create(&self, input: ApplicationInput) -> StoreResult<LoanApplication> {
        let key = input.application_number.clone();
        let result = self.create_inner(input);
        if result.is_ok() {
            self.metrics.increment_created();
            log_event_with_fields(Event::ApplicationCreated, &[("application_number", &key)]);
        }
        self.observe("create", &key, result)
    }

    fn create_inner(&self, input: ApplicationInput) -> StoreResult<LoanApplication> {
        validate(&input).map_err(|v| StoreError::invalid_fields(&v))?;

        let _guard = self.lock_writer();
        let _lock = self.file.lock()?;
        let mut index = self.load_index()?;

        if index.contains(&input.application_number) {
            return Err(StoreError::DuplicateKey(input.application_number));
        }

        let record = input.into_application(Utc::now());
        index
            .insert(record.clone())
            .map_err(|r| StoreError::DuplicateKey(r.application_number))?;

        self.commit(&index)?;
        Ok(record)
    }

    /// Replace the record stored under `application_number`.
    ///
    /// The path key wins over any key in `input`; `dateApplied` is carried
    /// over from the stored record.
    pub fn update(
        &self,
        application_number: &str,
        input: ApplicationInput,
    ) -> StoreResult<LoanApplication> {
        let result = self.update_inner(application_number, input);
        if result.is_ok() {
            self.metrics.increment_updated();
            log_event_with_fields(
                Event::ApplicationUpdated,
                &[("application_number", application_number)],
            );
        }
        self.observe("update", application_number, result)
    }

    fn update_inner(
        &self,
        application_number: &str,
        mut input: ApplicationInput,
    ) -> StoreResult<LoanApplication> {
        Self::require_key(application_number)?;

        input.application_number = application_number.to_string();
        validate(&input).map_err(|v| StoreError::invalid_fields(&v))?;

        let _guard = self.lock_writer();
        let _lock = self.file.lock()?;
        let mut index = self.load_index()?;

        let date_applied = index
            .get(application_number)
            .map(|existing| existing.date_applied)
            .ok_or_else(|| StoreError::NotFound(application_number.to_string()))?;

        let record = input.into_application(date_applied);
        index
            .replace(record.clone())
            .map_err(|r| StoreError::NotFound(r.application_number))?;

        self.commit(&index)?;
        Ok(record)
    }

    /// Remove every record stored under `application_number`.
    ///
    /// Returns the number of records removed (1 unless the file held duplicates).
    pub fn delete(&self, application_number: &str) -> StoreResult<usize> {
        let result = self.delete_inner(application_number);
        if let Ok(removed) = result {
            self.metrics.increment_deleted();
            log_event_with_fields(
                Event::ApplicationDeleted,
                &[
                    ("application_number", application_number),
                    ("removed", &removed.to_string()),
                ],
            );
        }
        self.observe("delete", application_number, result)
    }

    fn delete_inner(&self, application_number: &str) -> StoreResult<usize> {
        Self::require_key(application_number)?;

        let _guard = self.lock_writer();
        let _lock = self.file.lock()?;
        let mut index = self.load_index()?;

        let removed = index.remove_all(application_number);
        if removed == 0 {
            return Err(StoreError::NotFound(application_number.to_string()));
        }

        self.commit(&index)?;
        Ok(removed)
    }

    fn require_key(application_number: &str) -> StoreResult<()> {
        if is_blank(application_number) {
            Err(StoreError::blank_key())
        } else {
            Ok(())
        }
    }

    /// The guard protects no data of its own, so a panic in another writer
    /// leaves nothing inconsistent behind.
    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load_index(&self) -> StoreResult<ApplicationIndex> {
        match self.file.load() {
            Ok(records) => Ok(ApplicationIndex::from_records(records)),
            Err(e) => {
                if e.is_fatal() {
                    self.metrics.increment_corruptions();
                    log_event_with_fields(
                        Event::StoreCorruption,
                        &[("path", &self.path_str()), ("error", &e.to_string())],
                    );
                }
                Err(e)
            }
        }
    }

    fn commit(&self, index: &ApplicationIndex) -> StoreResult<()> {
        match self.file.commit(index.records()) {
            Ok(()) => {
                self.metrics.increment_commits();
                log_event_with_fields(
                    Event::StoreCommit,
                    &[("path", &self.path_str()), ("records", &index.len().to_string())],
                );
                Ok(())
            }
            Err(e) => {
                self.metrics.increment_commit_failures();
                log_event_with_fields(
                    Event::StoreCommitFailed,
                    &[("path", &self.path_str()), ("error", &e.to_string())],
                );
                Err(e)
            }
        }
    }

    fn observe<T>(&self, operation: &str, key: &str, result: StoreResult<T>) -> StoreResult<T> {
        if let Err(ref e) = result {
            if e.is_rejection() {
                self.metrics.increment_rejected();
                log_event_with_fields(
                    Event::ApplicationRejected,
                    &[
                        ("application_number", key),
                        ("code", e.code()),
                        ("operation", operation),
                        ("reason", &e.to_string()),
                    ],
                );
            }
        }
        result
    }
}
