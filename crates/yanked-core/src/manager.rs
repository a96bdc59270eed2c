use std::{path::PathBuf, time::Duration};

use tracing::trace;
use yanked_config::config::{Config, DEFAULT_DOWNLOAD_TIMEOUT};
use yanked_dl::{Fetcher, Http};

use crate::{
    error::YankedError,
    package::{
        record::{PackageRecord, Records},
        runner::{ScriptRunner, SystemRunner},
    },
    store::RecordStore,
    YankedResult,
};

/// Everything the lifecycle manager needs to know about its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory receiving installed files and the record file.
    pub install_dir: PathBuf,
    /// Upper bound for each download.
    pub download_timeout: Duration,
}

impl Settings {
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        }
    }

    pub fn from_config(config: &Config) -> YankedResult<Self> {
        Ok(Self {
            install_dir: config.get_bin_path()?,
            download_timeout: config.get_download_timeout(),
        })
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }
}

/// Installs, upgrades and removes packages, keeping the record store in sync.
pub struct PackageManager {
    pub(crate) settings: Settings,
    pub(crate) store: RecordStore,
    pub(crate) fetcher: Box<dyn Fetcher>,
    pub(crate) runner: Box<dyn ScriptRunner>,
}

impl PackageManager {
    /// Manager using the shared HTTP client and real subprocesses.
    pub fn new(settings: Settings) -> Self {
        Self::with_collaborators(settings, Box::new(Http), Box::new(SystemRunner))
    }

    pub fn with_collaborators(
        settings: Settings,
        fetcher: Box<dyn Fetcher>,
        runner: Box<dyn ScriptRunner>,
    ) -> Self {
        trace!(
            install_dir = %settings.install_dir.display(),
            timeout_secs = settings.download_timeout.as_secs(),
            "creating package manager"
        );
        let store = RecordStore::in_dir(&settings.install_dir);
        Self {
            settings,
            store,
            fetcher,
            runner,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// All installed packages, sorted by name.
    pub fn list(&self) -> Records {
        self.store.load()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.load().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<PackageRecord> {
        self.store.get(name)
    }

    /// Downloads `url` within the configured timeout.
    pub fn fetch(&self, url: &str) -> YankedResult<Vec<u8>> {
        self.fetcher
            .fetch(url, self.settings.download_timeout)
            .map_err(|source| {
                YankedError::FetchFailed {
                    url: url.to_string(),
                    source,
                }
            })
    }
}


#[cfg(test)]
mod tests {
    use super::{test_support::harness, *};

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::new("/opt/bin");
        assert_eq!(settings.install_dir, PathBuf::from("/opt/bin"));
        assert_eq!(settings.download_timeout, Duration::from_secs(30));

        let settings = settings.with_download_timeout(Duration::from_secs(5));
        assert_eq!(settings.download_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_store_lives_in_install_dir() {
        let h = harness();
        assert_eq!(
            h.manager.store().path(),
            h.dir.path().join("bin").join(".yankpacks")
        );
        assert!(h.manager.list().is_empty());
        assert!(!h.manager.contains("demo"));
    }

    #[test]
    fn test_fetch_maps_errors() {
        let h = harness();
        h.fetcher.set("https://x/ok", b"data");

        assert_eq!(h.manager.fetch("https://x/ok").unwrap(), b"data");
        assert!(matches!(
            h.manager.fetch("https://x/missing"),
            Err(YankedError::FetchFailed { url, .. }) if url == "https://x/missing"
        ));
    }
}
