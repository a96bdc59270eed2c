use std::{
    fs::{self, Permissions},
    io::{ErrorKind, Write},
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};
use yanked_utils::{
    fs::{atomic_write, ensure_dir_exists, make_executable},
    hash::fingerprint,
};

use crate::{
    constants::{INSTALLER_MODE, INSTALLER_PREFIX},
    error::{InstallStage, YankedError},
    manager::PackageManager,
    package::{
        record::{InstallMethod, PackageRecord},
        runner::{describe_exit, InstallerEnv},
        url::ensure_valid_name,
    },
    YankedResult,
};

/// Everything needed to install one package. The content has already been fetched.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub name: String,
    pub source_url: String,
    pub file_url: String,
    pub content: Vec<u8>,
    pub method: InstallMethod,
}

#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub name: String,
    pub record: PackageRecord,
    /// An existing record with the same name was overwritten.
    pub replaced: bool,
}

fn install_failed(name: &str, stage: InstallStage, reason: impl ToString) -> YankedError {
    YankedError::InstallFailed {
        name: name.to_string(),
        stage,
        reason: reason.to_string(),
    }
}

/// Removes a file the replaced record tracked but the new one does not, so it is not
/// left behind untracked.
fn remove_stale_file(name: &str, path: &Path) -> YankedResult<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(pkg_name = name, path = %path.display(), "removed file of replaced record");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(install_failed(
            name,
            InstallStage::Write,
            format!("could not remove previous file {}: {}", path.display(), err),
        )),
    }
}

impl PackageManager {
    /// Installs `request.content` under `request.name`.
    ///
    /// The artifact is written (or the installer run) first; the record is only persisted
    /// once that succeeded.
    ///
    /// # Errors
    ///
    /// * [`YankedError::InvalidName`] before anything touches the disk.
    /// * [`YankedError::InstallFailed`] naming the stage that failed. This includes removing
    ///   the file of a replaced record that the new record no longer tracks.
    /// * [`YankedError::PersistFailed`] if the record file cannot be written.
    pub fn install(&self, request: &InstallRequest) -> YankedResult<InstallOutcome> {
        ensure_valid_name(&request.name)?;

        let install_dir = &self.settings.install_dir;
        ensure_dir_exists(install_dir)
            .map_err(|err| install_failed(&request.name, InstallStage::Write, err))?;

        let file_hash = fingerprint(&request.content);
        let record = match request.method {
            InstallMethod::DirectFile => {
                let path = self.write_executable(request)?;
                PackageRecord::direct_file(&request.source_url, &request.file_url, path, file_hash)
            }
            InstallMethod::CustomInstaller => {
                self.run_installer(request)?;
                PackageRecord::custom_installer(&request.source_url, &request.file_url, file_hash)
            }
        };

        let mut records = self.store.load();
        let previous = records.insert(request.name.clone(), record.clone());
        if let Some(stale) = previous
            .as_ref()
            .and_then(PackageRecord::file_path)
            .filter(|old| Some(*old) != record.file_path())
        {
            remove_stale_file(&request.name, stale)?;
        }
        self.store.save(&records)?;
        let replaced = previous.is_some();

        info!(
            pkg_name = %request.name,
            method = %request.method,
            replaced,
            "installed package"
        );

        Ok(InstallOutcome {
            name: request.name.clone(),
            record,
            replaced,
        })
    }

    fn write_executable(&self, request: &InstallRequest) -> YankedResult<PathBuf> {
        let path = self.settings.install_dir.join(&request.name);

        atomic_write(&path, &request.content)
            .map_err(|err| install_failed(&request.name, InstallStage::Write, err))?;
        let mode = make_executable(&path)
            .map_err(|err| install_failed(&request.name, InstallStage::Permissions, err))?;

        debug!(
            path = %path.display(),
            mode = %format!("{mode:o}"),
            size = request.content.len(),
            "wrote package file"
        );
        Ok(path)
    }

    fn run_installer(&self, request: &InstallRequest) -> YankedResult<()> {
        let name = &request.name;

        let mut file = tempfile::Builder::new()
            .prefix(INSTALLER_PREFIX)
            .tempfile()
            .map_err(|err| install_failed(name, InstallStage::Write, err))?;
        file.write_all(&request.content)
            .and_then(|()| file.flush())
            .map_err(|err| install_failed(name, InstallStage::Write, err))?;
        file.as_file()
            .set_permissions(Permissions::from_mode(INSTALLER_MODE))
            .map_err(|err| install_failed(name, InstallStage::Permissions, err))?;

        // The write handle must be closed before exec.
        let script = file.into_temp_path();

        let env = InstallerEnv {
            install_dir: &self.settings.install_dir,
            pkg_name: name,
            source_url: &request.source_url,
        };
        let result = self.runner.run(&script, &env);

        if let Err(err) = script.close() {
            warn!("Failed to remove temporary installer: {}", err);
        }

        let status = result.map_err(|err| install_failed(name, InstallStage::Execute, err))?;
        if !status.success() {
            return Err(install_failed(
                name,
                InstallStage::Installer,
                format!("installer exited with {}", describe_exit(&status)),
            ));
        }

        debug!(pkg_name = %name, "custom installer finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, os::unix::fs::PermissionsExt};

    use super::*;
    use crate::manager::test_support::harness;

    const HI_SHA256: &str = "8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4";

    fn request(name: &str, method: InstallMethod, content: &[u8]) -> InstallRequest {
        InstallRequest {
            name: name.into(),
            source_url: "https://github.com/u/r".into(),
            file_url: "https://raw.githubusercontent.com/u/r/main/demo.sh".into(),
            content: content.to_vec(),
            method,
        }
    }

    #[test]
    fn test_install_direct_file() {
        let h = harness();
        let outcome = h
            .manager
            .install(&request("demo", InstallMethod::DirectFile, b"hi"))
            .unwrap();

        let path = h.manager.settings().install_dir.join("demo");
        assert_eq!(fs::read(&path).unwrap(), b"hi");
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_ne!(mode & 0o100, 0);

        assert!(!outcome.replaced);
        assert_eq!(outcome.record.file_hash(), HI_SHA256);
        assert_eq!(outcome.record.file_path(), Some(path.as_path()));
        assert_eq!(h.manager.get("demo"), Some(outcome.record));
        assert!(h.runner.runs.borrow().is_empty());
    }

    #[test]
    fn test_install_creates_missing_install_dir() {
        let h = harness();
        assert!(!h.manager.settings().install_dir.exists());

        h.manager
            .install(&request("demo", InstallMethod::DirectFile, b"x"))
            .unwrap();

        assert!(h.manager.store().path().is_file());
    }

    #[test]
    fn test_reinstall_replaces_record() {
        let h = harness();
        h.manager
            .install(&request("demo", InstallMethod::DirectFile, b"one"))
            .unwrap();
        let outcome = h
            .manager
            .install(&request("demo", InstallMethod::DirectFile, b"two"))
            .unwrap();

        assert!(outcome.replaced);
        assert_eq!(h.manager.list().len(), 1);
        assert_eq!(
            fs::read(h.manager.settings().install_dir.join("demo")).unwrap(),
            b"two"
        );
    }

    #[test]
    fn test_reinstall_as_installer_removes_previous_file() {
        let h = harness();
        let path = h.manager.settings().install_dir.join("demo");
        h.manager
            .install(&request("demo", InstallMethod::DirectFile, b"one"))
            .unwrap();
        assert!(path.is_file());

        let outcome = h
            .manager
            .install(&request("demo", InstallMethod::CustomInstaller, b"#!/bin/sh\n"))
            .unwrap();

        assert!(outcome.replaced);
        assert!(!path.exists());
        assert_eq!(
            h.manager.get("demo").unwrap().method(),
            InstallMethod::CustomInstaller
        );

        h.manager.uninstall("demo").unwrap();
        assert!(!path.exists());
        assert!(!h.manager.contains("demo"));
    }

    #[test]
    fn test_reinstall_as_installer_tolerates_missing_file() {
        let h = harness();
        let path = h.manager.settings().install_dir.join("demo");
        h.manager
            .install(&request("demo", InstallMethod::DirectFile, b"one"))
            .unwrap();
        fs::remove_file(&path).unwrap();

        h.manager
            .install(&request("demo", InstallMethod::CustomInstaller, b""))
            .unwrap();

        assert!(h.manager.get("demo").unwrap().file_path().is_none());
    }

    #[test]
    fn test_invalid_name_has_no_effect() {
        let h = harness();
        let result = h
            .manager
            .install(&request("bad name", InstallMethod::DirectFile, b"hi"));

        assert!(matches!(result, Err(YankedError::InvalidName(_))));
        assert!(!h.manager.settings().install_dir.exists());
    }

    #[test]
    fn test_custom_installer_runs_temporary_script() {
        let h = harness();
        let outcome = h
            .manager
            .install(&request("tool", InstallMethod::CustomInstaller, b"#!/bin/sh\n"))
            .unwrap();

        let runs = h.runner.runs.borrow();
        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert!(run.existed);
        assert_eq!(run.mode, INSTALLER_MODE);
        assert_eq!(run.content, b"#!/bin/sh\n");
        assert_eq!(run.pkg_name, "tool");
        assert_eq!(run.install_dir, h.manager.settings().install_dir);
        assert!(run
            .script
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(INSTALLER_PREFIX));
        assert!(!run.script.exists());

        assert_eq!(outcome.record.method(), InstallMethod::CustomInstaller);
        assert!(outcome.record.file_path().is_none());
        assert!(!h.manager.settings().install_dir.join("tool").exists());
        assert!(h.manager.contains("tool"));
    }

    #[test]
    fn test_failing_installer_writes_no_record() {
        let h = harness();
        *h.runner.raw_status.borrow_mut() = 1 << 8;

        let result = h
            .manager
            .install(&request("tool", InstallMethod::CustomInstaller, b"exit 1"));

        match result {
            Err(YankedError::InstallFailed { stage, reason, .. }) => {
                assert_eq!(stage, InstallStage::Installer);
                assert!(reason.contains("exit code 1"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!h.manager.contains("tool"));
        assert!(!h.runner.runs.borrow()[0].script.exists());
    }

    #[test]
    fn test_installer_spawn_failure() {
        let h = harness();
        *h.runner.fail_to_spawn.borrow_mut() = true;

        let result = h
            .manager
            .install(&request("tool", InstallMethod::CustomInstaller, b""));

        assert!(matches!(
            result,
            Err(YankedError::InstallFailed {
                stage: InstallStage::Execute,
                ..
            })
        ));
        assert!(h.manager.list().is_empty());
    }

    #[test]
    fn test_write_failure_keeps_store_unchanged() {
        let h = harness();
        let install_dir = h.manager.settings().install_dir.clone();
        fs::create_dir_all(install_dir.join("demo")).unwrap();

        let result = h
            .manager
            .install(&request("demo", InstallMethod::DirectFile, b"hi"));

        assert!(matches!(
            result,
            Err(YankedError::InstallFailed {
                stage: InstallStage::Write,
                ..
            })
        ));
        assert!(!h.manager.store().path().exists());
    }
}
