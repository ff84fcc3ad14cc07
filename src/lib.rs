//! # tacos CLI Library
//!
//! Core library functionality for the tacos CLI tool: clients for the Data
//! Type Registry (DTR) and the Metadata Schema and Crosswalk Registry (MSCR),
//! plus the command handlers built on them.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

pub mod commands;
pub mod config;
pub mod constants;
pub mod dtr;
pub mod error;
pub mod io;
pub mod json_schema;
pub mod logging;
pub mod mscr;
pub mod schema_tree;

pub use error::TacosError;

/// CLI tool for moving metadata schemas between DTR and MSCR
///
/// `dtr` commands fetch type records and schemas from a Data Type Registry;
/// `mscr` commands register schemas and attach DTR types in a Metadata Schema
/// and Crosswalk Registry.
#[derive(Parser)]
#[command(
    name = "tacos",
    version,
    about = "CLI tool for fetching schemas from DTR and registering them in MSCR",
    long_about = "Fetches type records and schemas from a Data Type Registry (DTR), converts them to JSON-Schema,\nand registers schemas and type bindings in a Metadata Schema and Crosswalk Registry (MSCR).\n\nRegistry URLs and the MSCR token can be given as options, environment variables\n(also read from .env), or in the configuration file."
)]
pub struct Cli {
    /// Set logging level
    #[arg(
        long,
        value_enum,
        env = "LOG_LEVEL",
        default_value_t = logging::LogLevel::Warning,
        ignore_case = true,
        global = true
    )]
    pub log_level: logging::LogLevel,
    /// Increase verbosity; repeat for more detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Configuration file [default: $TACOS_CONFIG or ~/.config/tacos/config.yaml]
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub cmd: Option<commands::Commands>,
}
