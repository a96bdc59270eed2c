//! Error types for yanked-core.

use std::{fmt, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;
use yanked_config::error::ConfigError;
use yanked_dl::error::DownloadError;
use yanked_utils::error::{FileSystemError, HashError, PathError};

/// Step of an installation that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallStage {
    /// Writing the downloaded content to disk.
    Write,
    /// Marking the written file executable.
    Permissions,
    /// Spawning the custom installer.
    Execute,
    /// The custom installer ran and reported failure.
    Installer,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            InstallStage::Write => "write",
            InstallStage::Permissions => "permissions",
            InstallStage::Execute => "execute",
            InstallStage::Installer => "installer",
        };
        f.write_str(stage)
    }
}

/// Core error type for yanked operations.
#[derive(Error, Diagnostic, Debug)]
pub enum YankedError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(code(yanked::fs), help("Check file permissions and disk space"))]
    FileSystemError(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(code(yanked::hash))]
    HashError(#[from] HashError),

    #[error(transparent)]
    #[diagnostic(code(yanked::path), help("Check the configured paths and environment"))]
    PathError(#[from] PathError),

    #[error("Error while {action}")]
    #[diagnostic(code(yanked::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid GitHub reference `{input}`: {reason}")]
    #[diagnostic(
        code(yanked::invalid_reference),
        help("Use https://github.com/<owner>/<repo> or a raw.githubusercontent.com URL")
    )]
    InvalidReference { input: String, reason: String },

    #[error("Invalid package name `{0}`")]
    #[diagnostic(
        code(yanked::invalid_name),
        help("Package names may only contain letters, digits, `-` and `_`")
    )]
    InvalidName(String),

    #[error("Failed to fetch {url}")]
    #[diagnostic(
        code(yanked::fetch),
        help("Check the URL and your internet connection")
    )]
    FetchFailed {
        url: String,
        #[source]
        source: DownloadError,
    },

    #[error("Failed to save package records to {}", path.display())]
    #[diagnostic(
        code(yanked::persist),
        help("Check that the install directory is writable")
    )]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: FileSystemError,
    },

    #[error("Failed to install '{name}' ({stage}): {reason}")]
    #[diagnostic(code(yanked::install))]
    InstallFailed {
        name: String,
        stage: InstallStage,
        reason: String,
    },

    #[error("Failed to upgrade '{name}': {reason}")]
    #[diagnostic(code(yanked::upgrade))]
    UpgradeFailed { name: String, reason: String },

    #[error("Failed to uninstall '{name}': {reason}")]
    #[diagnostic(
        code(yanked::uninstall),
        help("The package record was kept; fix the problem and retry")
    )]
    UninstallFailed { name: String, reason: String },

    #[error("Package '{0}' is not installed")]
    #[diagnostic(
        code(yanked::package_not_found),
        help("Run 'yanked list' to see installed packages")
    )]
    PackageNotFound(String),

    #[error("{0}")]
    #[diagnostic(code(yanked::error))]
    Custom(String),
}

impl YankedError {
    /// Renders the error with its whole source chain on one line.
    pub fn chain_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            let text = err.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = err.source();
        }
        message
    }
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, YankedError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, YankedError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            YankedError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_install_failed_display() {
        let err = YankedError::InstallFailed {
            name: "demo".into(),
            stage: InstallStage::Installer,
            reason: "exited with status 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to install 'demo' (installer): exited with status 1"
        );
    }

    #[test]
    fn test_with_context() {
        let result: io::Result<()> = Err(io::Error::other("boom"));
        let err = result.with_context(|| "reading input".into()).unwrap_err();
        assert_eq!(err.to_string(), "Error while reading input");
        assert_eq!(err.chain_message(), "Error while reading input: boom");
    }

    #[test]
    fn test_chain_message_includes_fetch_cause() {
        let err = YankedError::FetchFailed {
            url: "https://raw.githubusercontent.com/u/r/main/x.sh".into(),
            source: DownloadError::HttpError {
                status: 404,
                url: "https://raw.githubusercontent.com/u/r/main/x.sh".into(),
            },
        };
        let message = err.chain_message();
        assert!(message.starts_with("Failed to fetch"));
        assert!(message.contains("HTTP 404"));
    }
}
