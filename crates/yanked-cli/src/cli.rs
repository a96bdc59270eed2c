use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set request headers, e.g. "Authorization: token ..."
    #[arg(required = false, long, short = 'H', global = true)]
    pub header: Option<Vec<String>>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    /// Runs the interactive installer when omitted
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a script or installer from GitHub (interactive)
    #[clap(name = "install", visible_alias = "i")]
    Install,

    /// List installed packages
    #[clap(name = "list", visible_alias = "ls")]
    List,

    /// Uninstall a package
    #[command(arg_required_else_help = true)]
    #[clap(name = "uninstall", visible_alias = "remove", visible_alias = "rm")]
    Uninstall {
        /// Package to uninstall
        #[arg(required = true)]
        package: String,

        /// Skip the confirmation prompt
        #[arg(required = false, short, long)]
        yes: bool,
    },

    /// Show details of an installed package
    #[command(arg_required_else_help = true)]
    #[clap(name = "info", visible_alias = "show")]
    Info {
        /// Package to inspect
        #[arg(required = true)]
        package: String,
    },

    /// Upgrade one package, or all of them
    #[clap(name = "upgrade", visible_alias = "up")]
    Upgrade {
        /// Package to upgrade
        #[arg(required = false)]
        package: Option<String>,
    },

    /// View env
    #[clap(name = "env")]
    Env,

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_install() {
        let args = Args::try_parse_from(["yanked"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_uninstall_arguments() {
        let args = Args::try_parse_from(["yanked", "rm", "demo", "-y"]).unwrap();
        match args.command {
            Some(Commands::Uninstall { package, yes }) => {
                assert_eq!(package, "demo");
                assert!(yes);
            }
            _ => panic!("expected uninstall"),
        }
    }

    #[test]
    fn test_upgrade_without_name_and_global_flags() {
        let args =
            Args::try_parse_from(["yanked", "upgrade", "-vv", "-H", "A: b", "-H", "C: d"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Upgrade { package: None })));
        assert_eq!(args.verbose, 2);
        assert_eq!(args.header.map(|h| h.len()), Some(2));
    }

    #[test]
    fn test_info_requires_name() {
        assert!(Args::try_parse_from(["yanked", "info"]).is_err());
    }
}
