use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pkgsync",
    about = "Declarative package reconciliation",
    long_about = "Keep Homebrew, App Store, pacman, AUR, apt, dnf, flatpak and cargo packages in line with one JSON file",
    version,
    next_line_help = false,
    term_width = 80
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser, Debug)]
pub struct GlobalFlags {
    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Declared config file (default: $PKGSYNC_CONFIG or the user config dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Lockfile (default: $PKGSYNC_LOCKFILE or the user config dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub lockfile: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install declared packages that are missing
    Sync,

    /// Upgrade outdated packages on every available manager
    Upgrade {
        /// Confirm each package
        #[arg(short = 'i', long)]
        interactive: bool,

        /// Trust the bulk upgrade instead of re-checking and retrying
        #[arg(long, conflicts_with = "interactive")]
        no_verify: bool,
    },

    /// List installed packages that are not declared
    Orphans {
        /// Remove them
        #[arg(long)]
        purge: bool,

        /// Remove without asking per package
        #[arg(short = 'y', long, requires = "purge")]
        yes: bool,
    },

    /// Inspect or refresh the lockfile
    Lock {
        #[command(subcommand)]
        command: LockCommand,
    },

    /// Config file maintenance
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockCommand {
    /// Record what is installed right now
    Update,
    /// Show what changed since the lockfile was written
    Diff,
    /// Print the lockfile
    Show,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Rewrite a legacy config in the current schema
    Migrate {
        /// Config to migrate (default: the active config)
        path: Option<PathBuf>,
    },
}
