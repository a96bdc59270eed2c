use std::{
    io,
    path::Path,
    process::{Command, ExitStatus},
    sync::atomic::{AtomicUsize, Ordering},
};

use tracing::debug;

use crate::constants::{ENV_INSTALL_DIR, ENV_PACKAGE, ENV_SOURCE};

static RUNNING_INSTALLERS: AtomicUsize = AtomicUsize::new(0);

/// Whether an installer child process is currently running.
///
/// The child shares the terminal's process group and receives Ctrl-C itself, so an
/// interrupt handler should let it exit and let the caller clean up instead of exiting.
pub fn installer_running() -> bool {
    RUNNING_INSTALLERS.load(Ordering::SeqCst) > 0
}

struct RunningGuard;

impl RunningGuard {
    fn enter() -> Self {
        RUNNING_INSTALLERS.fetch_add(1, Ordering::SeqCst);
        RunningGuard
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        RUNNING_INSTALLERS.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Environment variables passed to custom installers.
pub struct InstallerEnv<'a> {
    pub install_dir: &'a Path,
    pub pkg_name: &'a str,
    pub source_url: &'a str,
}

/// Runs a downloaded installer and reports how it exited.
pub trait ScriptRunner {
    fn run(&self, script: &Path, env: &InstallerEnv) -> io::Result<ExitStatus>;
}

/// Executes installers as child processes that inherit the terminal.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl ScriptRunner for SystemRunner {
    fn run(&self, script: &Path, env: &InstallerEnv) -> io::Result<ExitStatus> {
        debug!(
            pkg_name = env.pkg_name,
            script = %script.display(),
            "running custom installer"
        );

        let _running = RunningGuard::enter();
        Command::new(script)
            .env(ENV_INSTALL_DIR, env.install_dir)
            .env(ENV_PACKAGE, env.pkg_name)
            .env(ENV_SOURCE, env.source_url)
            .status()
    }
}

/// Human readable exit description, e.g. `exit code 3` or `signal 9`.
pub fn describe_exit(status: &ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => format!("exit code {code}"),
        (None, Some(signal)) => format!("signal {signal}"),
        (None, None) => "unknown status".to_string(),
    }
}
