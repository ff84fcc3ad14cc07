//! Configuration management for the tacos CLI
//!
//! Registry endpoints and credentials come from, in order of precedence:
//! 1. Command-line options
//! 2. Environment variables (`DTR_URL`, `MSCR_URL`, `MSCR_TOKEN`), which may
//!    also be set in a `.env` file in the working directory
//! 3. The configuration file
//! 4. Built-in defaults
//!
//! ## Configuration File
//!
//! Looked up at `--config`, then `TACOS_CONFIG`, then
//! `~/.config/tacos/config.yaml`. A missing file is an empty configuration.
//!
//! ## Environment Variable Expansion
//!
//! The file supports environment variable expansion with the following syntax:
//! - `${VAR}` - Simple substitution
//! - `${VAR:-default}` - Use default if VAR is unset or empty
//! - `${VAR-default}` - Use default if VAR is unset
//! - `${VAR:+alt}` - Use alt if VAR is set and non-empty
//! - `${VAR+alt}` - Use alt if VAR is set

use crate::constants::{CONFIG_ENV, CONFIG_FILE, DEFAULT_DTR_URL, DEFAULT_MSCR_URL};
use crate::error::TacosError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use std::{env, fs, path::PathBuf};

/// Contents of `config.yaml`
///
/// # Example
///
/// ```yaml
/// dtr:
///   url: https://typeapi.lab.pidconsortium.net
/// mscr:
///   url: ${MSCR_URL:-https://mscr-test.rahtiapp.fi}
///   token: ${MSCR_TOKEN}
///   metadata:
///     namespace: http://example.com/schemas
///     label:
///       en: Example schema
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TacosConfig {
    #[serde(default)]
    pub dtr: DtrConfig,
    #[serde(default)]
    pub mscr: MscrConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DtrConfig {
    /// Base URL of the Data Type Registry
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MscrConfig {
    /// Base URL of the Metadata Schema and Crosswalk Registry
    #[serde(default)]
    pub url: Option<String>,
    /// Bearer token for the MSCR API
    #[serde(default)]
    pub token: Option<String>,
    /// Overrides for the metadata sent with `register-schema`
    #[serde(default)]
    pub metadata: Option<SchemaMetadata>,
}

/// Metadata sent to MSCR alongside a registered schema document.
///
/// Field names and defaults match what the MSCR web UI submits; note that it
/// sends both `status` and `state`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaMetadata {
    pub namespace: String,
    pub description: BTreeMap<String, String>,
    pub label: BTreeMap<String, String>,
    pub languages: Vec<String>,
    pub organizations: Vec<String>,
    pub status: String,
    pub format: String,
    pub state: String,
    pub version_label: String,
}

impl Default for SchemaMetadata {
    fn default() -> Self {
        SchemaMetadata {
            namespace: "http://test.com".to_string(),
            description: BTreeMap::new(),
            label: BTreeMap::from([("en".to_string(), "test".to_string())]),
            languages: vec!["en".to_string()],
            organizations: Vec::new(),
            status: "DRAFT".to_string(),
            format: "JSONSCHEMA".to_string(),
            state: "DRAFT".to_string(),
            version_label: "1".to_string(),
        }
    }
}

/// Connection settings for one registry after all sources are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub url: String,
    pub token: Option<String>,
}

impl TacosConfig {
    /// Resolve the DTR endpoint. `cli_url` already includes `DTR_URL` via clap.
    pub fn dtr_endpoint(&self, cli_url: Option<&str>) -> Endpoint {
        Endpoint {
            url: pick(cli_url, self.dtr.url.as_deref(), DEFAULT_DTR_URL),
            token: None,
        }
    }

    /// Resolve the MSCR endpoint. Empty tokens count as unset.
    pub fn mscr_endpoint(&self, cli_url: Option<&str>, cli_token: Option<&str>) -> Endpoint {
        let token = cli_token
            .filter(|t| !t.trim().is_empty())
            .or(self.mscr.token.as_deref().filter(|t| !t.trim().is_empty()))
            .map(str::to_string);
        Endpoint {
            url: pick(cli_url, self.mscr.url.as_deref(), DEFAULT_MSCR_URL),
            token,
        }
    }

    /// Metadata from the config file, or the built-in defaults.
    pub fn schema_metadata(&self) -> SchemaMetadata {
        self.mscr.metadata.clone().unwrap_or_default()
    }
}

fn pick(cli: Option<&str>, file: Option<&str>, default: &str) -> String {
    let url = cli
        .filter(|u| !u.trim().is_empty())
        .or(file.filter(|u| !u.trim().is_empty()))
        .unwrap_or(default);
    url.trim().trim_end_matches('/').to_string()
}

/// Path of the configuration file when `--config` is not given
pub fn default_config_path() -> PathBuf {
    env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push(CONFIG_FILE);
            p
        })
}

/// Load the configuration file, expanding environment placeholders first.
///
/// An explicitly requested file must exist; the default location may be absent.
pub fn load_config(explicit: Option<&Path>) -> Result<TacosConfig, TacosError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = default_config_path();
            if !p.exists() {
                log::debug!("no configuration file at {}", p.display());
                return Ok(TacosConfig::default());
            }
            p
        }
    };
    let raw = preprocess_config(&path)?;
    if raw.trim().is_empty() {
        return Ok(TacosConfig::default());
    }
    log::debug!("loaded configuration from {}", path.display());
    serde_yaml::from_str(&raw)
        .map_err(|e| TacosError::Config(format!("{}: {e}", path.display())))
}

pub fn preprocess_config(path: &Path) -> Result<String, TacosError> {
    let raw_data = fs::read_to_string(path).map_err(|source| TacosError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(expand_env_placeholders(&raw_data))
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?:(:?[-+])([^}]*))?\}")
            .expect("placeholder pattern is valid")
    })
}

pub fn expand_env_placeholders(input: &str) -> String {
    placeholder_regex()
        .replace_all(input, |caps: &regex::Captures| {
            let var = env::var(&caps[1]).ok();
            let op = caps.get(2).map_or("", |m| m.as_str());
            let val = caps.get(3).map_or("", |m| m.as_str());

            match (var.as_deref(), op) {
                (Some(v), "") => v.to_string(),                      // ${VAR}
                (Some(v), ":-") if !v.is_empty() => v.to_string(),  // ${VAR:-default}
                (_, ":-") => val.to_string(),
                (Some(v), "-") => v.to_string(),                     // ${VAR-default}
                (None, "-") => val.to_string(),
                (Some(v), ":+") if !v.is_empty() => val.to_string(), // ${VAR:+alt}
                (Some(_), "+") => val.to_string(),                   // ${VAR+alt}
                _ => String::new(),
            }
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_url_wins_over_file_and_default() {
        let cfg = TacosConfig {
            dtr: DtrConfig {
                url: Some("https://file.example/".into()),
            },
            ..Default::default()
        };
        assert_eq!(
            cfg.dtr_endpoint(Some("https://cli.example")).url,
            "https://cli.example"
        );
        assert_eq!(cfg.dtr_endpoint(None).url, "https://file.example");
        assert_eq!(
            TacosConfig::default().dtr_endpoint(Some("  ")).url,
            DEFAULT_DTR_URL
        );
    }

    #[test]
    fn blank_token_is_treated_as_absent() {
        let cfg = TacosConfig::default();
        let ep = cfg.mscr_endpoint(None, Some(""));
        assert_eq!(ep.url, DEFAULT_MSCR_URL);
        assert_eq!(ep.token, None);

        let mut cfg = TacosConfig::default();
        cfg.mscr.token = Some("from-file".to_string());
        let ep = cfg.mscr_endpoint(None, Some(""));
        assert_eq!(ep.token.as_deref(), Some("from-file"));
        let ep = cfg.mscr_endpoint(None, Some("  "));
        assert_eq!(ep.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn expands_defaults_for_unset_variables() {
        let out = expand_env_placeholders("url: ${TACOS_TEST_SURELY_UNSET_VAR:-http://fallback}");
        assert_eq!(out, "url: http://fallback");
        let out = expand_env_placeholders("token: ${TACOS_TEST_SURELY_UNSET_VAR}");
        assert_eq!(out, "token: ");
    }

    #[test]
    fn partial_metadata_keeps_defaults() {
        let cfg: TacosConfig = serde_yaml::from_str(
            "mscr:\n  metadata:\n    namespace: http://example.com/ns\n",
        )
        .unwrap();
        let md = cfg.schema_metadata();
        assert_eq!(md.namespace, "http://example.com/ns");
        assert_eq!(md.format, "JSONSCHEMA");
        assert_eq!(md.label.get("en").map(String::as_str), Some("test"));
    }
}
