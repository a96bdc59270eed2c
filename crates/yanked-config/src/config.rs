use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use yanked_utils::{
    fs::ensure_dir_exists,
    path::{home_dir, resolve_path, xdg_config_home},
    time::parse_duration,
};

use crate::error::{ConfigError, Result};

/// Overrides the configuration file location.
pub const CONFIG_ENV: &str = "YANKED_CONFIG";

/// Overrides the directory packages are installed into.
pub const BIN_ENV: &str = "YANKED_BIN";

pub const DEFAULT_BIN_PATH: &str = "~/.local/bin";
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Application's configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory where installed scripts and the `.yankpacks` record file live.
    /// Default: ~/.local/bin
    pub bin_path: Option<String>,

    /// Upper bound for a single download, e.g. `30s` or `1m`.
    /// Default: 30s
    pub download_timeout: Option<String>,

    /// User agent sent with every request.
    /// Default: yanked/<version> (GitHub Package Manager)
    pub user_agent: Option<String>,
}

/// Returns the configuration file path, honoring `$YANKED_CONFIG`.
pub fn default_config_path() -> PathBuf {
    match std::env::var(CONFIG_ENV) {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("yanked").join("config.toml"),
    }
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            bin_path: Some(DEFAULT_BIN_PATH.to_string()),
            download_timeout: Some("30s".to_string()),
            user_agent: None,
        }
    }

    /// Loads the configuration from `path`.
    /// If the file is not found, the default configuration is used.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                toml::from_str(&content)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "no configuration at {}, using defaults",
                    path.display()
                );
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    /// Fills unset fields with defaults and validates the rest.
    pub fn resolve(&mut self) -> Result<()> {
        self.bin_path.get_or_insert_with(|| DEFAULT_BIN_PATH.to_string());

        if let Some(timeout) = &self.download_timeout {
            if parse_duration(timeout).is_none_or(|d| d.is_zero()) {
                return Err(ConfigError::InvalidDuration(timeout.clone()));
            }
        } else {
            self.download_timeout = Some("30s".to_string());
        }

        if self.user_agent.as_deref().is_some_and(|ua| ua.trim().is_empty()) {
            self.user_agent = None;
        }

        Ok(())
    }

    pub fn get_bin_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var(BIN_ENV) {
            return Ok(resolve_path(&env_path)?);
        }
        if let Some(bin_path) = &self.bin_path {
            return Ok(resolve_path(bin_path)?);
        }
        Ok(home_dir().join(".local").join("bin"))
    }

    pub fn get_download_timeout(&self) -> Duration {
        self.download_timeout
            .as_deref()
            .and_then(parse_duration)
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            ensure_dir_exists(parent)?;
        }
        fs::write(path, serialized)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// Writes the default configuration to `path`, refusing to overwrite an existing file.
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(
            path.display().to_string(),
        ));
    }

    Config::default_config().save(path)
}
