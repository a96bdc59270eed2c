use std::{fs, io, path::PathBuf};

use tracing::{debug, info, warn};

use crate::{
    error::YankedError, manager::PackageManager, package::record::PackageRecord, YankedResult,
};

/// What happened to the tracked file during uninstall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRemoval {
    Removed(PathBuf),
    /// The record pointed at a file that was already gone.
    AlreadyMissing(PathBuf),
    /// The package had no tracked file.
    NotTracked,
}

#[derive(Debug, Clone)]
pub struct RemovalReport {
    pub name: String,
    pub record: PackageRecord,
    pub file: FileRemoval,
}

fn uninstall_failed(name: &str, reason: impl ToString) -> YankedError {
    YankedError::UninstallFailed {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

impl PackageManager {
    /// Removes the tracked file of `name`, if any, then its record.
    ///
    /// A tracked file that no longer exists only produces a warning.
    ///
    /// # Errors
    ///
    /// * [`YankedError::PackageNotFound`] if `name` has no record.
    /// * [`YankedError::UninstallFailed`] if an existing file cannot be removed. The record is
    ///   kept.
    /// * [`YankedError::PersistFailed`] if the record file cannot be written.
    pub fn uninstall(&self, name: &str) -> YankedResult<RemovalReport> {
        let mut records = self.store.load();
        let record = records
            .remove(name)
            .ok_or_else(|| YankedError::PackageNotFound(name.to_string()))?;

        let file = match record.file_path() {
            None => FileRemoval::NotTracked,
            Some(path) => {
                match fs::symlink_metadata(path) {
                    Ok(_) => {
                        fs::remove_file(path).map_err(|err| {
                            uninstall_failed(
                                name,
                                format!("could not remove {}: {}", path.display(), err),
                            )
                        })?;
                        debug!(path = %path.display(), "removed package file");
                        FileRemoval::Removed(path.to_path_buf())
                    }
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {
                        warn!(
                            "File {} for '{}' was already removed",
                            path.display(),
                            name
                        );
                        FileRemoval::AlreadyMissing(path.to_path_buf())
                    }
                    Err(err) => {
                        return Err(uninstall_failed(
                            name,
                            format!("could not inspect {}: {}", path.display(), err),
                        ));
                    }
                }
            }
        };

        self.store.save(&records)?;
        info!(pkg_name = name, "uninstalled package");

        Ok(RemovalReport {
            name: name.to_string(),
            record,
            file,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{fs::Permissions, os::unix::fs::PermissionsExt};

    use super::*;
    use crate::{
        manager::test_support::{harness, Harness},
        package::{install::InstallRequest, record::InstallMethod},
    };

    fn install(h: &Harness, name: &str, method: InstallMethod) {
        h.manager
            .install(&InstallRequest {
                name: name.into(),
                source_url: "https://github.com/u/r".into(),
                file_url: format!("https://raw.githubusercontent.com/u/r/main/{name}.sh"),
                content: b"hi".to_vec(),
                method,
            })
            .unwrap();
    }

    #[test]
    fn test_uninstall_direct_file_removes_file_and_record() {
        let h = harness();
        install(&h, "demo", InstallMethod::DirectFile);
        install(&h, "keep", InstallMethod::DirectFile);
        let path = h.manager.settings().install_dir.join("demo");

        let report = h.manager.uninstall("demo").unwrap();

        assert_eq!(report.file, FileRemoval::Removed(path.clone()));
        assert!(!path.exists());
        assert!(!h.manager.contains("demo"));
        assert!(h.manager.contains("keep"));
        assert!(h.manager.settings().install_dir.join("keep").exists());
    }

    #[test]
    fn test_uninstall_custom_installer_removes_record_only() {
        let h = harness();
        install(&h, "tool", InstallMethod::CustomInstaller);

        let report = h.manager.uninstall("tool").unwrap();

        assert_eq!(report.file, FileRemoval::NotTracked);
        assert_eq!(report.record.method(), InstallMethod::CustomInstaller);
        assert!(h.manager.list().is_empty());
    }

    #[test]
    fn test_uninstall_with_missing_file_still_removes_record() {
        let h = harness();
        install(&h, "demo", InstallMethod::DirectFile);
        let path = h.manager.settings().install_dir.join("demo");
        fs::remove_file(&path).unwrap();

        let report = h.manager.uninstall("demo").unwrap();

        assert_eq!(report.file, FileRemoval::AlreadyMissing(path));
        assert!(!h.manager.contains("demo"));
    }

    #[test]
    fn test_uninstall_unknown_package() {
        let h = harness();
        assert!(matches!(
            h.manager.uninstall("ghost"),
            Err(YankedError::PackageNotFound(_))
        ));
    }

    #[test]
    fn test_removal_failure_keeps_record() {
        let h = harness();
        install(&h, "demo", InstallMethod::DirectFile);
        let install_dir = h.manager.settings().install_dir.clone();

        fs::set_permissions(&install_dir, Permissions::from_mode(0o555)).unwrap();
        let result = h.manager.uninstall("demo");
        fs::set_permissions(&install_dir, Permissions::from_mode(0o755)).unwrap();

        if !yanked_utils::user::is_root() {
            assert!(matches!(result, Err(YankedError::UninstallFailed { .. })));
            assert!(h.manager.contains("demo"));
            assert!(install_dir.join("demo").exists());
        }
    }
}
