use nu_ansi_term::Color::{Blue, Cyan, Green, Magenta, Yellow};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::{debug, error, info};
use yanked_core::{
    package::{
        install::InstallRequest,
        record::InstallMethod,
        url::{build_raw_url, resolve, suggest_name, validate_name},
    },
    PackageManager, YankedResult,
};

use crate::utils::{confirm_action, interactive_ask, Colored, Icons, Prompt};

const METHODS: [InstallMethod; 2] = [InstallMethod::DirectFile, InstallMethod::CustomInstaller];

/// Answers collected before anything is downloaded.
struct InstallPlan {
    name: String,
    source_url: String,
    file_url: String,
    method: InstallMethod,
}

fn ask_source() -> YankedResult<Option<(String, String)>> {
    loop {
        let question = format!("{} ", Colored(Cyan, "GitHub URL:"));
        let Some(input) = interactive_ask(&question)?.answer() else {
            return Ok(None);
        };
        if input.is_empty() {
            continue;
        }

        match resolve(&input) {
            Ok(resolved) => {
                if let Some(raw) = resolved.raw_url() {
                    return Ok(Some((raw.to_string(), raw.to_string())));
                }
                let source_url = resolved.source_url().to_string();
                info!("Which file should be installed from the repository?");
                info!("Examples: install.sh, bin/tool, scripts/run.py");

                loop {
                    let question = format!("{} ", Colored(Cyan, "File path:"));
                    let Some(path) = interactive_ask(&question)?.answer() else {
                        return Ok(None);
                    };
                    match build_raw_url(&source_url, &path) {
                        Ok(file_url) => return Ok(Some((source_url, file_url))),
                        Err(err) => error!("{}", err),
                    }
                }
            }
            Err(err) => error!("{}", err),
        }
    }
}

fn ask_method() -> YankedResult<Option<InstallMethod>> {
    info!("Install method:");
    for (idx, method) in METHODS.iter().enumerate() {
        info!("  [{}] {}", idx + 1, method.description());
    }

    loop {
        let Some(input) = interactive_ask("Select a method [1]: ")?.answer() else {
            return Ok(None);
        };
        if input.is_empty() {
            return Ok(Some(METHODS[0]));
        }
        match input.parse::<usize>() {
            Ok(n) if n > 0 && n <= METHODS.len() => return Ok(Some(METHODS[n - 1])),
            _ => error!("Invalid selection, please try again."),
        }
    }
}

fn ask_name(file_url: &str) -> YankedResult<Option<String>> {
    let suggestion = suggest_name(file_url);
    let question = match &suggestion {
        Some(name) => format!("Package name [{}]: ", Colored(Green, name)),
        None => "Package name: ".to_string(),
    };

    loop {
        let Some(input) = interactive_ask(&question)?.answer() else {
            return Ok(None);
        };
        let name = match (input.is_empty(), &suggestion) {
            (true, Some(name)) => name.clone(),
            (true, None) => continue,
            (false, _) => input,
        };

        if validate_name(&name) {
            return Ok(Some(name));
        }
        error!("Names may only contain letters, digits, '-' and '_'.");
    }
}

fn collect_plan(manager: &PackageManager) -> YankedResult<Option<InstallPlan>> {
    info!(
        "{} You can provide either a repository URL (https://github.com/user/repo)",
        Icons::PACKAGE
    );
    info!("   or a raw file URL (https://raw.githubusercontent.com/user/repo/main/file)");
    info!("   Type 'quit' or 'exit' at any prompt to cancel.\n");

    let Some((source_url, file_url)) = ask_source()? else {
        return Ok(None);
    };
    let Some(method) = ask_method()? else {
        return Ok(None);
    };
    let Some(name) = ask_name(&file_url)? else {
        return Ok(None);
    };

    if manager.contains(&name) {
        let question = format!(
            "{} {} is already installed. Overwrite?",
            Icons::WARNING,
            Colored(Yellow, &name)
        );
        if confirm_action(&question)? != Prompt::Answer(true) {
            return Ok(None);
        }
    }

    Ok(Some(InstallPlan {
        name,
        source_url,
        file_url,
        method,
    }))
}

fn print_summary(manager: &PackageManager, plan: &InstallPlan) {
    let mut builder = Builder::new();

    builder.push_record([
        format!("{} Name", Icons::PACKAGE),
        Colored(Blue, &plan.name).to_string(),
    ]);
    builder.push_record([
        format!("{} Method", Icons::TYPE),
        Colored(Magenta, plan.method.description()).to_string(),
    ]);
    builder.push_record([format!("{} Source", Icons::LINK), plan.source_url.clone()]);
    builder.push_record([
        format!("{} Download", Icons::LINK),
        Colored(Blue, &plan.file_url).to_string(),
    ]);
    if plan.method == InstallMethod::DirectFile {
        builder.push_record([
            format!("{} Install to", Icons::ARROW),
            manager
                .settings()
                .install_dir
                .join(&plan.name)
                .display()
                .to_string(),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header("Installation Summary"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");
}

pub fn interactive_install(manager: &PackageManager) -> YankedResult<()> {
    let Some(plan) = collect_plan(manager)? else {
        info!("Installation cancelled");
        return Ok(());
    };

    print_summary(manager, &plan);
    if confirm_action("Proceed with installation?")? != Prompt::Answer(true) {
        info!("Installation cancelled");
        return Ok(());
    }

    info!("Downloading {}", Colored(Blue, &plan.file_url));
    let content = manager.fetch(&plan.file_url)?;
    debug!(size = content.len(), "downloaded content");

    if plan.method == InstallMethod::CustomInstaller {
        info!("Running installer for {}", Colored(Cyan, &plan.name));
    }

    let outcome = manager.install(&InstallRequest {
        name: plan.name,
        source_url: plan.source_url,
        file_url: plan.file_url,
        content,
        method: plan.method,
    })?;

    info!(
        "{} Installed {}",
        Colored(Green, Icons::CHECK),
        Colored(Blue, &outcome.name)
    );
    if let Some(path) = outcome.record.file_path() {
        info!("Location: {}", path.display());
        info!("Run with: {}", Colored(Cyan, &outcome.name));
    }

    Ok(())
}
