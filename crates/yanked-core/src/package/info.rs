use yanked_utils::hash::verify_checksum;

use crate::{
    error::YankedError, manager::PackageManager, package::record::PackageRecord, YankedResult,
};

/// Live state of a package's tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// The file exists. `hash_matches` is `None` if it could not be read.
    Present { hash_matches: Option<bool> },
    Missing,
    /// Custom installers leave no file behind.
    NotTracked,
}

#[derive(Debug, Clone)]
pub struct PackageInfo {
    pub name: String,
    pub record: PackageRecord,
    pub file_status: FileStatus,
}

impl PackageManager {
    /// Stored record of `name` plus the current state of its file on disk.
    pub fn info(&self, name: &str) -> YankedResult<PackageInfo> {
        let record = self
            .store
            .get(name)
            .ok_or_else(|| YankedError::PackageNotFound(name.to_string()))?;

        let file_status = match record.file_path() {
            None => FileStatus::NotTracked,
            Some(path) if path.is_file() => {
                FileStatus::Present {
                    hash_matches: verify_checksum(path, record.file_hash()).ok(),
                }
            }
            Some(_) => FileStatus::Missing,
        };

        Ok(PackageInfo {
            name: name.to_string(),
            record,
            file_status,
        })
    }
}
