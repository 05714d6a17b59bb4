//! AirGuard - command-line entry point

use clap::Parser;

mod cli;

use cli::{run_command, Cli};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    log::debug!("Starting {} v{}", airguard::constants::APP_NAME, airguard::constants::APP_VERSION);

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
