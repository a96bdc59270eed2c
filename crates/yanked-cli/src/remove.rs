use nu_ansi_term::Color::{Blue, Cyan, Green};
use tracing::{debug, info};
use yanked_core::{error::YankedError, package::remove::FileRemoval, PackageManager, YankedResult};

use crate::utils::{confirm_action, Colored, Icons, Prompt};

pub fn uninstall_package(manager: &PackageManager, name: &str, yes: bool) -> YankedResult<()> {
    debug!(pkg_name = name, yes, "starting package removal");

    let record = manager
        .get(name)
        .ok_or_else(|| YankedError::PackageNotFound(name.to_string()))?;

    if !yes {
        info!("This will remove: {}", Colored(Cyan, name));
        match record.file_path() {
            Some(path) => info!("Location: {}", path.display()),
            None => {
                info!("Files created by its installer are not tracked and will be left in place.")
            }
        }
        if confirm_action("Are you sure?")? != Prompt::Answer(true) {
            info!("Removal cancelled");
            return Ok(());
        }
    }

    let report = manager.uninstall(name)?;

    if let FileRemoval::Removed(path) = &report.file {
        debug!(path = %path.display(), "removed file");
    }
    info!(
        "{} Uninstalled {}",
        Colored(Green, Icons::CHECK),
        Colored(Blue, &report.name)
    );

    Ok(())
}
