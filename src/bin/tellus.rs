use clap::Parser;
use std::process;
use tellus::cli::{self, Cli};
use tellus::{config, core::db::Engine};
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let config = match config::discover_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Initialize the logging system using tracing subscriber
    cli::init_logging(config.log_filter());

    let mut engine_config = config.engine_config();
    if let Some(db) = cli.db {
        engine_config.db_path = db;
    }
    info!("Using store {}", engine_config.db_path.display());

    let engine = Engine::new(engine_config);
    match cli::run(&engine, &cli.command) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Command {:?} failed: {}", cli.command, e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
