use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::config::TacosConfig;
use crate::dtr::DtrClient;
use crate::io::write_output;

#[derive(Args, Debug)]
pub struct DtrArgs {
    /// Base URL for DTR
    #[arg(long, env = "DTR_URL", global = true)]
    pub dtr_url: Option<String>,
    /// Output file [default: STDOUT]
    #[arg(long, default_value = "-", global = true)]
    pub output_file: String,
    #[command(subcommand)]
    pub cmd: DtrCommands,
}

#[derive(Subcommand, Debug)]
pub enum DtrCommands {
    /// Fetch a DTR type record and output it as served
    FetchType {
        /// PID of the type in DTR
        type_id: String,
    },
    /// Fetch a schema record from DTR and output it
    FetchSchema {
        /// Replace every referenced type PID with its resolved record
        #[arg(long)]
        resolve_subtypes: bool,
        /// PID of the schema in DTR, e.g. 21.T11969/f67c4f7359d2a211fb80
        #[arg(env = "DTR_SCHEMA")]
        dtr_schema_pid: String,
    },
    /// Fetch a schema from DTR in JSON-Schema format and output it
    FetchJsonSchema {
        /// PID of the schema in DTR
        #[arg(env = "DTR_SCHEMA")]
        dtr_schema_pid: String,
    },
}

pub async fn run(args: DtrArgs, config: &TacosConfig) -> Result<()> {
    let endpoint = config.dtr_endpoint(args.dtr_url.as_deref());
    let client = DtrClient::new(&endpoint)?;

    let output = match &args.cmd {
        DtrCommands::FetchType { type_id } => client
            .fetch_type(type_id)
            .await
            .with_context(|| format!("fetching type {type_id} from {}", client.base_url))?,
        DtrCommands::FetchSchema {
            resolve_subtypes: false,
            dtr_schema_pid,
        } => client.fetch_schema(dtr_schema_pid).await.with_context(|| {
            format!(
                "fetching schema {dtr_schema_pid}; maybe it does not exist at {}?",
                client.base_url
            )
        })?,
        DtrCommands::FetchSchema {
            resolve_subtypes: true,
            dtr_schema_pid,
        } => {
            let resolved = client
                .fetch_resolved_schema(dtr_schema_pid)
                .await
                .with_context(|| format!("resolving types of schema {dtr_schema_pid}"))?;
            serde_json::to_string_pretty(&resolved)?
        }
        DtrCommands::FetchJsonSchema { dtr_schema_pid } => {
            let schema = client.fetch_json_schema(dtr_schema_pid).await.with_context(|| {
                format!(
                    "JSON-Schema for {dtr_schema_pid} could not be fetched from {}",
                    client.json_schema_url(dtr_schema_pid)
                )
            })?;
            serde_json::to_string_pretty(&schema)?
        }
    };

    write_output(&args.output_file, &output)?;
    Ok(())
}
