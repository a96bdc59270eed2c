use nu_ansi_term::Color::{Blue, Cyan, Green, Red, Yellow};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::{debug, error, info};
use yanked_core::{
    package::update::{UpgradeOutcome, UpgradeReport},
    PackageManager, YankedResult,
};

use crate::utils::{short_hash, Colored, Icons};

fn print_outcome(outcome: &UpgradeOutcome) {
    if outcome.changed {
        info!(
            "{} Upgraded {}",
            Colored(Green, Icons::CHECK),
            Colored(Blue, &outcome.name)
        );
        info!("  Previous hash: {}...", short_hash(&outcome.old_hash));
        info!("  Current hash:  {}...", short_hash(&outcome.new_hash));
    } else {
        info!("{} is already up to date", Colored(Blue, &outcome.name));
    }
}

pub fn upgrade_package(manager: &PackageManager, name: &str) -> YankedResult<()> {
    info!("Checking {} for updates...", Colored(Cyan, name));
    let outcome = manager.upgrade(name)?;
    print_outcome(&outcome);
    Ok(())
}

fn summary_table(report: &UpgradeReport) -> String {
    let mut builder = Builder::new();

    builder.push_record([
        format!("{} Updated", Icons::CHECK),
        format!(
            "{}/{}",
            Colored(Green, report.updated_count()),
            Colored(Cyan, report.total())
        ),
    ]);
    builder.push_record([
        format!("{} Up to date", Icons::PACKAGE),
        Colored(Blue, report.up_to_date_count()).to_string(),
    ]);
    if report.failed_count() > 0 {
        builder.push_record([
            format!("{} Failed", Icons::CROSS),
            Colored(Red, report.failed_count()).to_string(),
        ]);
    }

    builder
        .build()
        .with(Panel::header("Upgrade Summary"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string()
}

pub fn upgrade_packages(manager: &PackageManager) {
    if manager.list().is_empty() {
        info!("No packages installed to upgrade.");
        return;
    }

    info!("Checking all packages for updates...");
    let report = manager.upgrade_all();

    for outcome in &report.updated {
        print_outcome(outcome);
    }
    for name in &report.up_to_date {
        debug!(pkg_name = name, "up to date");
    }
    for failed in &report.failed {
        error!(
            "{} {}: {}",
            Colored(Yellow, Icons::WARNING),
            failed.name,
            failed.error.chain_message()
        );
    }

    info!(
        updated = report.updated_count(),
        up_to_date = report.up_to_date_count(),
        failed = report.failed_count(),
        "\n{}",
        summary_table(&report)
    );
}
