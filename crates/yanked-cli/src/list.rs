use nu_ansi_term::Color::{Blue, Cyan, Green, Magenta, Red, Yellow};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::{debug, info};
use yanked_core::{
    package::{
        info::{FileStatus, PackageInfo},
        record::InstallMethod,
    },
    PackageManager, YankedResult,
};

use crate::utils::{short_hash, Colored, Icons};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn list_packages(manager: &PackageManager) {
    let records = manager.list();
    debug!(count = records.len(), "listing installed packages");

    if records.is_empty() {
        info!("No packages installed yet.");
        info!("Run '{}' to install your first package!", Colored(Cyan, "yanked"));
        return;
    }

    let mut builder = Builder::new();
    builder.push_record(["Name", "Method", "Source", "Installed"]);

    for (name, record) in &records {
        builder.push_record([
            Colored(Blue, name).to_string(),
            Colored(Magenta, record.method()).to_string(),
            record.source_url().to_string(),
            Colored(Green, record.install_date().format(DATE_FORMAT)).to_string(),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header("Installed Packages"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!(count = records.len(), "\n{table}");
}

fn describe_status(info: &PackageInfo) -> String {
    match info.file_status {
        FileStatus::Present {
            hash_matches: Some(true),
        } => format!("{} Installed", Colored(Green, Icons::CHECK)),
        FileStatus::Present {
            hash_matches: Some(false),
        } => {
            format!(
                "{} Installed (modified since install)",
                Colored(Yellow, Icons::WARNING)
            )
        }
        FileStatus::Present { hash_matches: None } => {
            format!(
                "{} Installed (unreadable)",
                Colored(Yellow, Icons::WARNING)
            )
        }
        FileStatus::Missing => format!("{} Missing (file not found)", Colored(Red, Icons::CROSS)),
        FileStatus::NotTracked => "Installer ran; no tracked file".to_string(),
    }
}

pub fn show_info(manager: &PackageManager, name: &str) -> YankedResult<()> {
    let info = manager.info(name)?;
    let record = &info.record;

    let mut builder = Builder::new();

    builder.push_record([
        format!("{} Name", Icons::PACKAGE),
        Colored(Blue, &info.name).to_string(),
    ]);
    builder.push_record([
        format!("{} Method", Icons::TYPE),
        Colored(Magenta, record.method().description()).to_string(),
    ]);
    builder.push_record([
        format!("{} Source", Icons::LINK),
        record.source_url().to_string(),
    ]);
    builder.push_record([
        format!("{} Download", Icons::LINK),
        Colored(Blue, record.file_url()).to_string(),
    ]);

    match (record.method(), record.file_path()) {
        (_, Some(path)) => {
            builder.push_record([
                format!("{} Install Path", Icons::SCRIPT),
                path.display().to_string(),
            ]);
        }
        (InstallMethod::CustomInstaller, None) => {
            builder.push_record([
                format!("{} Install Path", Icons::SCRIPT),
                "N/A (custom installer)".to_string(),
            ]);
        }
        (InstallMethod::DirectFile, None) => {}
    }

    builder.push_record([
        format!("{} Installed", Icons::CALENDAR),
        record.install_date().format(DATE_FORMAT).to_string(),
    ]);
    if let Some(updated) = record.last_update() {
        builder.push_record([
            format!("{} Updated", Icons::CALENDAR),
            updated.format(DATE_FORMAT).to_string(),
        ]);
    }
    builder.push_record([
        format!("{} Hash", Icons::CHECKSUM),
        format!("{}... (sha256)", Colored(Blue, short_hash(record.file_hash()))),
    ]);
    builder.push_record([format!("{} Status", Icons::CHECK), describe_status(&info)]);

    let table = builder
        .build()
        .with(Panel::header(format!("Package Info: {}", info.name)))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!(
        pkg_name = info.name,
        method = %record.method(),
        source_url = record.source_url(),
        file_url = record.file_url(),
        file_hash = record.file_hash(),
        "\n{table}"
    );

    Ok(())
}
