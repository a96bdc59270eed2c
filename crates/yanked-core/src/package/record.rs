use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// How a package was installed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallMethod {
    /// The downloaded content is the installed executable.
    #[default]
    #[serde(rename = "scr", alias = "direct-file")]
    DirectFile,
    /// The downloaded content is an installer that runs once.
    #[serde(rename = "inst", alias = "custom-installer")]
    CustomInstaller,
}

impl InstallMethod {
    pub fn label(&self) -> &'static str {
        match self {
            InstallMethod::DirectFile => "direct-file",
            InstallMethod::CustomInstaller => "custom-installer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            InstallMethod::DirectFile => "Script (installed as an executable)",
            InstallMethod::CustomInstaller => "Custom installer (run once)",
        }
    }
}

impl fmt::Display for InstallMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Persisted metadata of one installed package.
///
/// Fields are declared in alphabetical order so the serialized object has sorted keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    file_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_path: Option<PathBuf>,
    file_url: String,
    install_date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_update: Option<NaiveDateTime>,
    #[serde(default)]
    method: InstallMethod,
    source_url: String,
}

/// All records, keyed and ordered by package name.
pub type Records = BTreeMap<String, PackageRecord>;

pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl PackageRecord {
    /// Record for content installed as `file_path`.
    pub fn direct_file(
        source_url: impl Into<String>,
        file_url: impl Into<String>,
        file_path: impl Into<PathBuf>,
        file_hash: impl Into<String>,
    ) -> Self {
        Self {
            file_hash: file_hash.into(),
            file_path: Some(file_path.into()),
            file_url: file_url.into(),
            install_date: now(),
            last_update: None,
            method: InstallMethod::DirectFile,
            source_url: source_url.into(),
        }
    }

    /// Record for an installer that ran once and left nothing to track.
    pub fn custom_installer(
        source_url: impl Into<String>,
        file_url: impl Into<String>,
        file_hash: impl Into<String>,
    ) -> Self {
        Self {
            file_hash: file_hash.into(),
            file_path: None,
            file_url: file_url.into(),
            install_date: now(),
            last_update: None,
            method: InstallMethod::CustomInstaller,
            source_url: source_url.into(),
        }
    }

    pub fn method(&self) -> InstallMethod {
        self.method
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn file_url(&self) -> &str {
        &self.file_url
    }

    pub fn install_date(&self) -> NaiveDateTime {
        self.install_date
    }

    pub fn last_update(&self) -> Option<NaiveDateTime> {
        self.last_update
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn file_hash(&self) -> &str {
        &self.file_hash
    }

    /// Records new content written by an upgrade.
    pub(crate) fn mark_upgraded(&mut self, file_hash: String, at: NaiveDateTime) {
        self.file_hash = file_hash;
        self.last_update = Some(at);
    }

    /// Whether the record satisfies the per-method shape.
    pub fn is_well_formed(&self) -> bool {
        match self.method {
            InstallMethod::DirectFile => self.file_path.is_some(),
            InstallMethod::CustomInstaller => self.file_path.is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_constructors_enforce_shape() {
        let direct = PackageRecord::direct_file("src", "url", "/bin/demo", "abc");
        assert_eq!(direct.method(), InstallMethod::DirectFile);
        assert_eq!(direct.file_path(), Some(Path::new("/bin/demo")));
        assert!(direct.is_well_formed());
        assert!(direct.last_update().is_none());

        let installer = PackageRecord::custom_installer("src", "url", "abc");
        assert_eq!(installer.method(), InstallMethod::CustomInstaller);
        assert!(installer.file_path().is_none());
        assert!(installer.is_well_formed());
    }

    #[test]
    fn test_serialized_keys_are_sorted_and_optional_fields_omitted() {
        let record = PackageRecord::custom_installer("https://github.com/u/r", "raw", "abc");
        let text = serde_json::to_string(&record).unwrap();

        assert!(!text.contains("file_path"));
        assert!(!text.contains("last_update"));

        let keys = ["file_hash", "file_url", "install_date", "method", "source_url"];
        let positions: Vec<_> = keys.iter().map(|k| text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains(r#""method":"inst""#));
    }

    #[test]
    fn test_reads_existing_record_format() {
        let value = json!({
            "file_hash": "8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4",
            "file_path": "/home/me/.local/bin/demo",
            "file_url": "https://raw.githubusercontent.com/u/r/main/demo.sh",
            "install_date": "2024-01-31T09:15:00.123456",
            "last_update": "2024-02-01T10:00:00",
            "method": "scr",
            "source_url": "https://github.com/u/r"
        });
        let record: PackageRecord = serde_json::from_value(value).unwrap();

        assert_eq!(record.method(), InstallMethod::DirectFile);
        assert_eq!(
            record.install_date().to_string(),
            "2024-01-31 09:15:00.123456"
        );
        assert!(record.last_update().is_some());
    }

    #[test]
    fn test_accepts_long_method_names_and_missing_method() {
        let value = json!({
            "file_hash": "abc",
            "file_url": "u",
            "install_date": "2024-01-31T09:15:00",
            "method": "custom-installer",
            "source_url": "s"
        });
        let record: PackageRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.method(), InstallMethod::CustomInstaller);

        let legacy = json!({
            "file_hash": "abc",
            "file_path": "/x",
            "file_url": "u",
            "install_date": "2024-01-31T09:15:00",
            "source_url": "s"
        });
        let record: PackageRecord = serde_json::from_value(legacy).unwrap();
        assert_eq!(record.method(), InstallMethod::DirectFile);
    }

    #[test]
    fn test_mark_upgraded_keeps_identity() {
        let mut record = PackageRecord::direct_file("src", "url", "/bin/demo", "old");
        let installed = record.install_date();
        let at = now();

        record.mark_upgraded("new".into(), at);

        assert_eq!(record.file_hash(), "new");
        assert_eq!(record.last_update(), Some(at));
        assert_eq!(record.install_date(), installed);
        assert_eq!(record.source_url(), "src");
        assert_eq!(record.file_url(), "url");
    }

    #[test]
    fn test_method_display() {
        assert_eq!(InstallMethod::DirectFile.to_string(), "direct-file");
        assert_eq!(InstallMethod::CustomInstaller.to_string(), "custom-installer");
    }
}
