use anyhow::Result;
use clap::Subcommand;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::load_config;

pub mod completions;
pub mod dtr;
pub mod mscr;

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Fetch types and schemas from the Data Type Registry")]
    Dtr(dtr::DtrArgs),
    #[command(
        about = "Register schemas and attach types in the Metadata Schema and Crosswalk Registry"
    )]
    Mscr(mscr::MscrArgs),
    #[command(about = "Emit shell completion scripts (bash/zsh/fish)")]
    Completions { shell: String },
}

pub async fn run(cmd: Commands, config_path: Option<&Path>) -> Result<()> {
    let started = Instant::now();
    log::info!("Starting");
    let result = match cmd {
        Commands::Completions { shell } => completions::run(shell),
        Commands::Dtr(args) => {
            let config = load_config(config_path)?;
            dtr::run(args, &config).await
        }
        Commands::Mscr(args) => {
            let config = load_config(config_path)?;
            mscr::run(args, &config).await
        }
    };
    log::info!("Execution in {}", format_elapsed(started.elapsed()));
    log::info!("Finishing");
    result
}

/// `hh:mm:ss.ssss`
fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = (total % 60) as f64 + f64::from(elapsed.subsec_nanos()) / 1e9;
    format!("{hours:02}:{mins:02}:{secs:07.4}")
}
