//! # tacos
//!
//! Command-line client for two metadata registries:
//!
//! - **DTR** (Data Type Registry) stores type and schema records by PID.
//! - **MSCR** (Metadata Schema and Crosswalk Registry) stores metadata schemas
//!   and the mappings between them.
//!
//! ## Quick Start
//!
//! ```bash
//! # Print a type record exactly as the registry serves it
//! tacos dtr fetch-type 21.T11969/f67c4f7359d2a211fb80
//!
//! # Fetch a schema as JSON-Schema and register it in MSCR
//! tacos dtr fetch-json-schema 21.T11969/f67c4f7359d2a211fb80 --output-file schema.json
//! MSCR_TOKEN=... tacos mscr register-schema schema.json
//!
//! # Attach DTR types to the registered schema
//! tacos mscr add-types mscr:42 21.T11969/a 21.T11969/b
//! ```
//!
//! Exit codes: 0 success, 2 network error, 3 not found, 4 rejected document,
//! 5 conversion failure, 128 refused interactive stdin, 1 anything else.

use clap::Parser;
use tacos_cli::{commands, logging, Cli, TacosError};

/// Main entry point for the tacos CLI
///
/// Loads `.env`, parses command-line arguments and delegates to the command
/// handler. Failures are printed to stderr and turned into an exit code.
#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logging::init(cli.log_level, logging::Verbosity::from(cli.verbose));

    let cmd = cli.cmd.unwrap_or_else(|| {
        eprintln!("No command provided. Use --help to see available commands.");
        std::process::exit(1);
    });

    if let Err(err) = commands::run(cmd, cli.config.as_deref()).await {
        eprintln!("Error: {err:#}");
        let code = err
            .chain()
            .find_map(|e| e.downcast_ref::<TacosError>())
            .map_or(1, TacosError::exit_code);
        std::process::exit(code);
    }
}
