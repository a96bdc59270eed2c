use tracing::{debug, info, warn};
use yanked_utils::{
    fs::{atomic_write, make_executable},
    hash::fingerprint,
};

use crate::{
    error::YankedError,
    manager::PackageManager,
    package::record::{now, InstallMethod},
    YankedResult,
};

/// Result of checking one package for new content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOutcome {
    pub name: String,
    pub changed: bool,
    pub old_hash: String,
    pub new_hash: String,
}

#[derive(Debug)]
pub struct FailedInfo {
    pub name: String,
    pub error: YankedError,
}

/// Per-package results of [`PackageManager::upgrade_all`].
#[derive(Debug, Default)]
pub struct UpgradeReport {
    pub updated: Vec<UpgradeOutcome>,
    pub up_to_date: Vec<String>,
    pub failed: Vec<FailedInfo>,
}

impl UpgradeReport {
    pub fn updated_count(&self) -> usize {
        self.updated.len()
    }

    pub fn up_to_date_count(&self) -> usize {
        self.up_to_date.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn total(&self) -> usize {
        self.updated_count() + self.up_to_date_count() + self.failed_count()
    }
}

fn upgrade_failed(name: &str, reason: impl ToString) -> YankedError {
    YankedError::UpgradeFailed {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

impl PackageManager {
    /// Re-downloads the content of `name` and applies it if the fingerprint changed.
    ///
    /// Direct-file packages get their file replaced and made executable again. Custom
    /// installers are not re-run; only the stored fingerprint and timestamp move forward.
    /// Nothing is touched when the content is unchanged.
    ///
    /// # Errors
    ///
    /// * [`YankedError::PackageNotFound`] if `name` has no record.
    /// * [`YankedError::UpgradeFailed`] if fetching, writing or saving fails. The stored
    ///   record is unchanged in that case.
    pub fn upgrade(&self, name: &str) -> YankedResult<UpgradeOutcome> {
        let mut records = self.store.load();
        let record = records
            .get_mut(name)
            .ok_or_else(|| YankedError::PackageNotFound(name.to_string()))?;

        debug!(pkg_name = name, url = record.file_url(), "checking for update");
        let content = self
            .fetch(record.file_url())
            .map_err(|err| upgrade_failed(name, err.chain_message()))?;

        let old_hash = record.file_hash().to_string();
        let new_hash = fingerprint(&content);

        if new_hash == old_hash {
            debug!(pkg_name = name, "already up to date");
            return Ok(UpgradeOutcome {
                name: name.to_string(),
                changed: false,
                old_hash,
                new_hash,
            });
        }

        match record.method() {
            InstallMethod::DirectFile => {
                let path = record
                    .file_path()
                    .ok_or_else(|| upgrade_failed(name, "record has no file path"))?
                    .to_path_buf();
                atomic_write(&path, &content).map_err(|err| upgrade_failed(name, err))?;
                make_executable(&path).map_err(|err| upgrade_failed(name, err))?;
            }
            InstallMethod::CustomInstaller => {
                debug!(
                    pkg_name = name,
                    "installer content changed; recording new fingerprint"
                );
            }
        }

        record.mark_upgraded(new_hash.clone(), now());
        let method = record.method();
        if let Err(err) = self.store.save(&records) {
            if method == InstallMethod::DirectFile {
                // The file already holds the new content; the next upgrade reconciles the hash.
                warn!(
                    pkg_name = name,
                    recorded_hash = %old_hash,
                    file_hash = %new_hash,
                    "package file replaced but its record could not be saved"
                );
            }
            return Err(upgrade_failed(name, err.chain_message()));
        }

        info!(pkg_name = name, "upgraded package");
        Ok(UpgradeOutcome {
            name: name.to_string(),
            changed: true,
            old_hash,
            new_hash,
        })
    }

    /// Upgrades every installed package in name order.
    ///
    /// A failing package is recorded in the report and the rest are still processed.
    pub fn upgrade_all(&self) -> UpgradeReport {
        let names: Vec<String> = self.store.load().into_keys().collect();
        let mut report = UpgradeReport::default();

        for name in names {
            match self.upgrade(&name) {
                Ok(outcome) if outcome.changed => report.updated.push(outcome),
                Ok(_) => report.up_to_date.push(name),
                Err(error) => {
                    warn!("Failed to upgrade {}: {}", name, error.chain_message());
                    report.failed.push(FailedInfo { name, error });
                }
            }
        }

        debug!(
            updated = report.updated_count(),
            up_to_date = report.up_to_date_count(),
            failed = report.failed_count(),
            "upgrade run finished"
        );
        report
    }
}
