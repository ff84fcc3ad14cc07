use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use crate::config::{SchemaMetadata, TacosConfig};
use crate::error::TacosError;
use crate::io::{read_input, write_output};
use crate::mscr::{
    registration_parts, AddTypesRequest, MscrClient, TypeBinding, UPLOAD_FILE_NAME,
};
use crate::schema_tree::DtrSchema;

#[derive(Args, Debug)]
pub struct MscrArgs {
    /// Base URL for MSCR
    #[arg(long, env = "MSCR_URL", global = true)]
    pub mscr_url: Option<String>,
    /// Token for MSCR API
    #[arg(long, env = "MSCR_TOKEN", global = true, hide_env_values = true)]
    pub mscr_token: Option<String>,
    /// Output file [default: STDOUT]
    #[arg(long, default_value = "-", global = true)]
    pub output_file: String,
    /// If specified, no changes are made to MSCR
    #[arg(long, global = true)]
    pub dry_run: bool,
    #[command(subcommand)]
    pub cmd: MscrCommands,
}

#[derive(Subcommand, Debug)]
pub enum MscrCommands {
    /// Register a metadata schema into MSCR and print its identifier
    RegisterSchema {
        /// JSON-Schema document to register [default: STDIN]
        #[arg(default_value = "-")]
        schema_document: String,
        #[command(flatten)]
        metadata: MetadataArgs,
    },
    /// Attach DTR types to an existing MSCR schema
    AddTypes {
        /// Identifier of the schema in MSCR
        schema_id: String,
        /// PIDs of DTR types to attach
        type_ids: Vec<String>,
        /// Resolved DTR schema (from `dtr fetch-schema --resolve-subtypes`) to
        /// derive element bindings from
        #[arg(long)]
        input_file: Option<String>,
    },
}

/// Overrides for the metadata sent with a registration.
#[derive(Args, Debug, Default, Clone)]
pub struct MetadataArgs {
    /// Namespace URI of the schema
    #[arg(long)]
    pub namespace: Option<String>,
    /// Label as LANG=TEXT, or TEXT for English; repeatable
    #[arg(long = "label", value_name = "[LANG=]TEXT")]
    pub labels: Vec<String>,
    /// Language code of the schema; repeatable
    #[arg(long = "language", value_name = "LANG")]
    pub languages: Vec<String>,
    /// Version label of the schema
    #[arg(long)]
    pub version_label: Option<String>,
}

impl MetadataArgs {
    pub fn apply(&self, metadata: &mut SchemaMetadata) {
        if let Some(ns) = &self.namespace {
            metadata.namespace = ns.clone();
        }
        if !self.labels.is_empty() {
            metadata.label = self
                .labels
                .iter()
                .map(|l| match l.split_once('=') {
                    Some((lang, text)) => (lang.to_string(), text.to_string()),
                    None => ("en".to_string(), l.clone()),
                })
                .collect();
        }
        if !self.languages.is_empty() {
            metadata.languages = self.languages.clone();
        }
        if let Some(v) = &self.version_label {
            metadata.version_label = v.clone();
        }
    }
}

pub async fn run(args: MscrArgs, config: &TacosConfig) -> Result<()> {
    let endpoint = config.mscr_endpoint(args.mscr_url.as_deref(), args.mscr_token.as_deref());
    let client = MscrClient::new(&endpoint)?;

    match &args.cmd {
        MscrCommands::RegisterSchema {
            schema_document,
            metadata,
        } => {
            let document = parse_schema_document(&read_input(schema_document)?)
                .with_context(|| format!("reading schema document {schema_document}"))?;
            let mut md = config.schema_metadata();
            metadata.apply(&mut md);

            if args.dry_run {
                let (metadata_part, file_part) = registration_parts(&document, &md)?;
                log::warn!("Dry run: nothing sent to {}", client.register_url());
                log::info!(
                    "PUT {} (authorization: {})",
                    client.register_url(),
                    if endpoint.token.is_some() { "Bearer" } else { "none" }
                );
                log::info!("metadata part: {metadata_part}");
                log::debug!("file part ({UPLOAD_FILE_NAME}): {file_part}");
                return Ok(());
            }

            log::info!("This will take a LOT of time...keep waiting...");
            let registration = client
                .register_schema(&document, &md)
                .await
                .context("could not register JSON-Schema to MSCR")?;
            if let Some(status) = &registration.status {
                log::info!("Registered to MSCR with status {status}");
            }
            write_output(&args.output_file, &registration.schema_id)?;
        }
        MscrCommands::AddTypes {
            schema_id,
            type_ids,
            input_file,
        } => {
            let request = build_add_types_request(type_ids, input_file.as_deref())?;
            if args.dry_run {
                log::warn!("Dry run: nothing sent to {}", client.add_types_url(schema_id));
                write_output(&args.output_file, &serde_json::to_string_pretty(&request)?)?;
                return Ok(());
            }

            let resp = client
                .add_types(schema_id, &request)
                .await
                .with_context(|| format!("attaching types to MSCR schema {schema_id}"))?;
            let text = if resp.body.trim().is_empty() {
                resp.status.to_string()
            } else {
                resp.body
            };
            write_output(&args.output_file, &text)?;
        }
    }
    Ok(())
}

/// A registrable document is a JSON object.
pub fn parse_schema_document(text: &str) -> Result<Value, TacosError> {
    let doc: Value = serde_json::from_str(text)
        .map_err(|e| TacosError::Validation(format!("not a JSON document: {e}")))?;
    if !doc.is_object() {
        return Err(TacosError::Validation(
            "schema document must be a JSON object".to_string(),
        ));
    }
    Ok(doc)
}

/// Explicit type ids first, then one binding per element of `input_file`.
pub fn build_add_types_request(
    type_ids: &[String],
    input_file: Option<&str>,
) -> Result<AddTypesRequest, TacosError> {
    let mut types: Vec<TypeBinding> = type_ids
        .iter()
        .map(|pid| TypeBinding {
            pid: pid.clone(),
            path: None,
        })
        .collect();

    if let Some(path) = input_file {
        let text = read_input(path)?;
        let record: Value = serde_json::from_str(&text)
            .map_err(|e| TacosError::Conversion(format!("{path} is not JSON: {e}")))?;
        let schema = DtrSchema::from_resolved(&record)?;
        for (element_path, pid) in schema.element_paths() {
            log::debug!("{element_path} -> {pid}");
            types.push(TypeBinding {
                pid,
                path: Some(element_path),
            });
        }
    }

    if types.is_empty() {
        return Err(TacosError::Validation(
            "give at least one type id or --input-file".to_string(),
        ));
    }
    Ok(AddTypesRequest { types })
}
