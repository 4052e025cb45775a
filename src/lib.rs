pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod context;
pub mod core;
pub mod error;
pub mod packages;
pub mod project_identity;
pub mod state;
pub mod ui;
pub mod utils;

use clap::Parser;
use std::process::exit;

/// Run the pkgsync CLI entrypoint.
pub fn run_cli() {
    // 0. Initialize color settings (must be first)
    ui::init_colors();

    // 1. Signal handling: stop issuing further package manager commands
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!();
        ui::mark_interrupted();
        ui::warning("Operation cancelled by user; finishing the current step.");
    }) {
        ui::warning(&format!("Could not install Ctrl-C handler: {}", e));
    }

    // 2. Parse & Run
    let args = cli::args::Cli::parse();
    ui::set_quiet(args.global.quiet);
    ui::set_verbose(args.global.verbose);

    if let Err(e) = cli::dispatcher::dispatch(&args) {
        ui::error(&format!("{}", e));
        exit(1);
    }
}
