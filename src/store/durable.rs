//! Durable data file
//!
//! The whole record set lives in one JSON file. Every commit rewrites it:
//! 1. Serialize the full set
//! 2. Write to a uniquely named temp file in the same directory
//! 3. fsync the temp file
//! 4. Rename temp over the data file (atomic on POSIX)
//! 5. fsync the directory so the rename itself is durable
//!
//! A crash at any point leaves either the old file or the new file in
//! place, never a truncated one. Leftover temp files are ignored by `load`
//! and removed by `remove_stale_temp_files`.
//!
//! Writers in different processes serialize on an advisory lock held on a
//! sidecar `.<name>.lock` file next to the data file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use uuid::Uuid;

use crate::application::LoanApplication;
use crate::crash_point::{maybe_crash, points};
use crate::observability::{log_event_with_fields, Event};

use super::errors::{StoreError, StoreResult};

const TEMP_SUFFIX: &str = ".tmp";
const LOCK_SUFFIX: &str = ".lock";

/// Exclusive cross-process writer lock. Released on drop.
#[derive(Debug)]
pub struct WriterLock {
    file: File,
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// The on-disk record set.
#[derive(Debug, Clone)]
pub struct DataFile {
    path: PathBuf,
    dir: PathBuf,
    temp_prefix: String,
}

impl DataFile {
    /// Wrap a data file path. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            temp_prefix: format!(".{}.", file_name),
            path,
            dir,
        }
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the data file and its temp files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sidecar file the writer lock is taken on
    pub fn lock_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}{}", self.temp_prefix.trim_end_matches('.'), LOCK_SUFFIX))
    }

    fn open_lock_file(&self) -> StoreResult<(PathBuf, File)> {
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StoreError::io(format!("opening lock file {}", lock_path.display()), e))?;
        Ok((lock_path, file))
    }

    /// Block until this process holds the exclusive writer lock.
    ///
    /// Covers every load, mutate, commit cycle and temp cleanup, whichever
    /// process or store handle performs it.
    pub fn lock(&self) -> StoreResult<WriterLock> {
        let (lock_path, file) = self.open_lock_file()?;

        FileExt::lock_exclusive(&file).map_err(|e| {
            StoreError::io(format!("locking {}", lock_path.display()), e)
        })?;

        Ok(WriterLock { file })
    }

    /// Take the writer lock only if no one else holds it.
    ///
    /// Returns `Ok(None)` when another handle or process holds it.
    pub fn try_lock(&self) -> StoreResult<Option<WriterLock>> {
        let (lock_path, file) = self.open_lock_file()?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Some(WriterLock { file })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(StoreError::io(format!("locking {}", lock_path.display()), e)),
        }
    }

    /// Create the containing directory if missing.
    pub fn ensure_dir(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            StoreError::io(format!("creating directory {}", self.dir.display()), e)
        })
    }

    /// Load the full record set in file order.
    ///
    /// - absent file, empty or whitespace-only file, or JSON `null`: empty set
    /// - anything that is not a JSON array of records: `StorageCorruption`
    /// - unreadable file: `StorageIo`
    pub fn load(&self) -> StoreResult<Vec<LoanApplication>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::io(
                    format!("reading {}", self.path.display()),
                    e,
                ))
            }
        };

        let content = std::str::from_utf8(&bytes)
            .map_err(|e| StoreError::corruption(&self.path, format!("invalid UTF-8: {}", e)))?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records: Option<Vec<LoanApplication>> = serde_json::from_str(content)
            .map_err(|e| StoreError::corruption(&self.path, e.to_string()))?;

        Ok(records.unwrap_or_default())
    }

    /// Atomically replace the data file with `records`.
    ///
    /// On error the data file is untouched and the temp file is removed.
    pub fn commit(&self, records: &[LoanApplication]) -> StoreResult<()> {
        let content = serde_json::to_vec_pretty(records)
            .map_err(|e| StoreError::io("serializing record set", io::Error::from(e)))?;

        maybe_crash(points::STORE_BEFORE_TEMP_WRITE);

        let temp_path = self.new_temp_path();
        if let Err(e) = Self::write_temp(&temp_path, &content) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        maybe_crash(points::STORE_BEFORE_RENAME);

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::io(
                format!("renaming temp file over {}", self.path.display()),
                e,
            ));
        }

        maybe_crash(points::STORE_AFTER_RENAME);

        // The rename is already visible; a failed directory fsync only
        // weakens durability across power loss
        if let Err(e) = sync_dir(&self.dir) {
            log_event_with_fields(
                Event::StoreDirSyncFailed,
                &[
                    ("dir", &self.dir.display().to_string()),
                    ("error", &e.to_string()),
                ],
            );
        }

        Ok(())
    }

    fn write_temp(temp_path: &Path, content: &[u8]) -> StoreResult<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp_path)
            .map_err(|e| {
                StoreError::io(format!("creating temp file {}", temp_path.display()), e)
            })?;

        file.write_all(content).map_err(|e| {
            StoreError::io(format!("writing temp file {}", temp_path.display()), e)
        })?;

        maybe_crash(points::STORE_AFTER_TEMP_WRITE);

        file.sync_all().map_err(|e| {
            StoreError::io(format!("fsyncing temp file {}", temp_path.display()), e)
        })
    }

    fn new_temp_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", self.temp_prefix, Uuid::new_v4(), TEMP_SUFFIX))
    }

    fn is_temp_name(&self, name: &str) -> bool {
        name.starts_with(&self.temp_prefix) && name.ends_with(TEMP_SUFFIX)
    }

    /// Temp files left behind by interrupted commits
    pub fn stale_temp_files(&self) -> StoreResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::io(
                    format!("listing directory {}", self.dir.display()),
                    e,
                ))
            }
        };

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                StoreError::io(format!("listing directory {}", self.dir.display()), e)
            })?;
            let name = entry.file_name();
            if self.is_temp_name(&name.to_string_lossy()) {
                found.push(entry.path());
            }
        }
        found.sort();
        Ok(found)
    }

    /// Remove temp files left behind by interrupted commits.
    ///
    /// Callers hold the writer lock so no in-flight commit loses its temp file.
    pub fn remove_stale_temp_files(&self) -> StoreResult<usize> {
        let stale = self.stale_temp_files()?;
        for path in &stale {
            fs::remove_file(path).map_err(|e| {
                StoreError::io(format!("removing stale temp file {}", path.display()), e)
            })?;
        }
        Ok(stale.len())
    }
}

/// fsync a directory so a rename inside it survives power loss.
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}
