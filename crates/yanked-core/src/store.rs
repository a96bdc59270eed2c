//! Durable `name -> record` mapping kept in the install directory.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, error, trace, warn};
use yanked_utils::{error::FileSystemError, fs::atomic_write};

use crate::{
    constants::RECORDS_FILE,
    error::YankedError,
    package::record::{PackageRecord, Records},
    YankedResult,
};

#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by the record file inside `install_dir`.
    pub fn in_dir(install_dir: &Path) -> Self {
        Self::new(install_dir.join(RECORDS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every record.
    ///
    /// A missing file is an empty store. A file that cannot be read or parsed is moved aside
    /// to `<file>.corrupt-<timestamp>` and an empty store is returned, so the next save starts
    /// fresh without destroying the old data.
    pub fn load(&self) -> Records {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                trace!("no record file at {}", self.path.display());
                return Records::new();
            }
            Err(err) => {
                error!(
                    "Failed to read package records {}: {}",
                    self.path.display(),
                    err
                );
                self.quarantine();
                return Records::new();
            }
        };

        if content.iter().all(u8::is_ascii_whitespace) {
            debug!("record file {} is empty", self.path.display());
            return Records::new();
        }

        match serde_json::from_slice::<Records>(&content) {
            Ok(records) => {
                for (name, record) in &records {
                    if !record.is_well_formed() {
                        warn!(
                            "Record for '{}' does not match its install method ({})",
                            name,
                            record.method()
                        );
                    }
                }
                trace!(count = records.len(), "loaded package records");
                records
            }
            Err(err) => {
                error!(
                    "Package records {} are corrupt: {}",
                    self.path.display(),
                    err
                );
                self.quarantine();
                Records::new()
            }
        }
    }

    /// Looks up a single record.
    pub fn get(&self, name: &str) -> Option<PackageRecord> {
        self.load().remove(name)
    }

    /// Replaces the record file with `records`.
    ///
    /// Output is pretty-printed JSON with sorted keys, written through a temporary file and a
    /// rename. On failure the previous file is left as it was.
    pub fn save(&self, records: &Records) -> YankedResult<()> {
        let persist_failed = |source| {
            YankedError::PersistFailed {
                path: self.path.clone(),
                source,
            }
        };

        let mut json = serde_json::to_string_pretty(records).map_err(|err| {
            persist_failed(FileSystemError::File {
                path: self.path.clone(),
                action: "serialize",
                source: err.into(),
            })
        })?;
        json.push('\n');

        atomic_write(&self.path, json.as_bytes()).map_err(persist_failed)?;

        debug!(
            count = records.len(),
            "saved package records to {}",
            self.path.display()
        );
        Ok(())
    }

    fn quarantine(&self) -> Option<PathBuf> {
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
        let mut name = self.path.file_name()?.to_os_string();
        name.push(format!(".corrupt-{stamp}"));
        let target = self.path.with_file_name(name);

        match fs::rename(&self.path, &target) {
            Ok(()) => {
                warn!(
                    "Moved unreadable package records to {}; starting with an empty list",
                    target.display()
                );
                Some(target)
            }
            Err(err) => {
                warn!(
                    "Could not move unreadable package records aside: {}; starting with an empty list",
                    err
                );
                None
            }
        }
    }
}
