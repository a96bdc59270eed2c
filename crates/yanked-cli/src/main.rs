use std::{
    env,
    path::PathBuf,
    process::ExitCode,
    sync::atomic::{AtomicBool, Ordering},
};

use clap::Parser;
use cli::{Args, Commands};
use install::interactive_install;
use list::{list_packages, show_info};
use logging::setup_logging;
use nu_ansi_term::Color::Yellow;
use remove::uninstall_package;
use tracing::{debug, info, warn};
use update::{upgrade_package, upgrade_packages};
use ureq::{http::HeaderMap, Proxy};
use utils::{disable_color, parse_header, Colored};
use yanked_config::config::{default_config_path, generate_default_config, Config};
use yanked_core::{
    error::{ErrorContext, YankedError},
    package::runner::installer_running,
    PackageManager, Settings, YankedResult,
};
use yanked_dl::http_client::{configure_http_client, SHARED_AGENT};
use yanked_utils::path::resolve_path;

mod cli;
mod install;
mod list;
mod logging;
mod remove;
mod update;
mod utils;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

fn print_cancelled() {
    eprintln!("\n{}", Colored(Yellow, "Operation cancelled"));
}

/// Ctrl-C during a custom installer also reaches the child. The install then fails and
/// removes its temporary script before `main` reports the cancellation.
fn handle_interrupt() {
    if installer_running() {
        INTERRUPTED.store(true, Ordering::SeqCst);
        return;
    }
    print_cancelled();
    std::process::exit(0);
}

fn config_path(args: &Args) -> YankedResult<PathBuf> {
    let Some(ref c) = args.config else {
        return Ok(default_config_path());
    };

    let path = resolve_path(c)?;
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(env::current_dir()
            .with_context(|| "retrieving current directory".into())?
            .join(path))
    }
}

fn setup_http_client(args: &Args, config: &Config) -> YankedResult<()> {
    let proxy = args
        .proxy
        .as_deref()
        .map(|proxy| {
            Proxy::new(proxy)
                .map_err(|err| YankedError::Custom(format!("Invalid proxy '{proxy}': {err}")))
        })
        .transpose()?;

    let headers = match &args.header {
        Some(headers) => {
            let mut map = HeaderMap::new();
            for header in headers {
                let (key, value) = parse_header(header)?;
                map.append(key, value);
            }
            Some(map)
        }
        None => None,
    };

    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.user_agent.clone());

    configure_http_client(|client| {
        if proxy.is_some() {
            client.proxy = proxy;
        }
        if let Some(user_agent) = user_agent {
            client.user_agent = Some(user_agent);
        }
        if headers.is_some() {
            client.headers = headers;
        }
    });

    Ok(())
}

fn handle_cli() -> YankedResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        disable_color();
    }

    if let Err(err) = ctrlc::set_handler(handle_interrupt) {
        warn!("Failed to install interrupt handler: {}", err);
    }

    let config_path = config_path(&args)?;
    debug!(config = %config_path.display(), "using configuration file");

    if let Some(Commands::DefConfig) = args.command {
        generate_default_config(&config_path)?;
        return Ok(());
    }

    let config = Config::load(&config_path)?;
    setup_http_client(&args, &config)?;

    let manager = PackageManager::new(Settings::from_config(&config)?);

    match args.command {
        None | Some(Commands::Install) => interactive_install(&manager)?,
        Some(Commands::List) => list_packages(&manager),
        Some(Commands::Uninstall { package, yes }) => uninstall_package(&manager, &package, yes)?,
        Some(Commands::Info { package }) => show_info(&manager, &package)?,
        Some(Commands::Upgrade { package }) => {
            match package {
                Some(name) => upgrade_package(&manager, &name)?,
                None => upgrade_packages(&manager),
            }
        }
        Some(Commands::Env) => {
            let settings = manager.settings();
            info!("YANKED_CONFIG={}", config_path.display());
            info!("YANKED_BIN={}", settings.install_dir.display());
            info!("YANKED_RECORDS={}", manager.store().path().display());
            info!("YANKED_TIMEOUT={}s", settings.download_timeout.as_secs());
            info!(
                "YANKED_USER_AGENT={}",
                SHARED_AGENT.user_agent().unwrap_or_default()
            );
        }
        Some(Commands::DefConfig) => unreachable!(),
    }

    Ok(())
}

fn main() -> ExitCode {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    let result = handle_cli();
    if INTERRUPTED.load(Ordering::SeqCst) {
        print_cancelled();
        return ExitCode::SUCCESS;
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::FAILURE
        }
    }
}
