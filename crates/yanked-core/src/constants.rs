//! Constants used throughout yanked-core.

/// Name of the record file kept inside the install directory.
pub const RECORDS_FILE: &str = ".yankpacks";

/// Host serving raw repository content.
pub const RAW_CONTENT_HOST: &str = "raw.githubusercontent.com";

/// Branch used when building raw-content URLs from a repository page.
pub const DEFAULT_BRANCH: &str = "main";

/// Prefix of the temporary file a custom installer is written to.
pub const INSTALLER_PREFIX: &str = "yanked-installer-";

/// Mode of the temporary installer file.
pub const INSTALLER_MODE: u32 = 0o700;

/// Environment handed to custom installers.
pub const ENV_INSTALL_DIR: &str = "YANKED_BIN";
pub const ENV_PACKAGE: &str = "YANKED_PACKAGE";
pub const ENV_SOURCE: &str = "YANKED_SOURCE";
