//! Client for the Data Type Registry (DTR).
//!
//! The DTR serves type records at `/v1/types/{pid}` and a JSON-Schema
//! rendering of schema types at `/v1/types/schema/{pid}`. PIDs contain a
//! slash (`21.T11969/f67c...`) and are placed into the path as-is.

use crate::config::Endpoint;
use crate::constants::{DTR_SCHEMA_PATH, DTR_TYPES_PATH, MAX_RESOLVE_DEPTH};
use crate::error::TacosError;
use crate::json_schema;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// Boxed future for the recursive resolver.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub struct DtrClient {
    pub base_url: String,
    client: Client,
}

impl DtrClient {
    pub fn new(endpoint: &Endpoint) -> Result<Self, TacosError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent(concat!("tacos/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| TacosError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(DtrClient {
            base_url: endpoint.url.clone(),
            client,
        })
    }

    pub fn type_url(&self, type_id: &str) -> String {
        format!("{}{}{}", self.base_url, DTR_TYPES_PATH, type_id)
    }

    pub fn json_schema_url(&self, type_id: &str) -> String {
        format!("{}{}{}", self.base_url, DTR_SCHEMA_PATH, type_id)
    }

    /// Fetch the type record for `type_id`, body untouched.
    pub async fn fetch_type(&self, type_id: &str) -> Result<String, TacosError> {
        self.get_text(&self.type_url(type_id)).await
    }

    /// Fetch the record of a schema type, body untouched.
    ///
    /// In the DTR a schema is a type whose content lists its members, so
    /// this is the same resource as [`fetch_type`](Self::fetch_type).
    pub async fn fetch_schema(&self, type_id: &str) -> Result<String, TacosError> {
        let url = self.type_url(type_id);
        log::info!("Fetch DTR Schema from {url}");
        self.get_text(&url).await
    }

    /// Fetch a schema and replace every referenced type PID with its record.
    pub async fn fetch_resolved_schema(&self, type_id: &str) -> Result<Value, TacosError> {
        let record = self.fetch_record(type_id).await?;
        log::info!("Resolving types of {type_id}, this may take a while");
        let resolved = self.resolve_subtypes(record, 0).await?;
        log::info!("Types resolved");
        Ok(resolved)
    }

    /// Fetch the JSON-Schema rendering of `type_id` and normalise it.
    pub async fn fetch_json_schema(&self, type_id: &str) -> Result<Value, TacosError> {
        let url = self.json_schema_url(type_id);
        log::info!("Fetch JSON-Schema from {url}");
        let body = self.get_text(&url).await?;
        let doc: Value = serde_json::from_str(&body).map_err(|e| {
            TacosError::Conversion(format!("{url} did not return JSON: {e}"))
        })?;
        log::debug!("fetched JSON-Schema: {doc}");
        json_schema::convert(doc)
    }

    async fn fetch_record(&self, type_id: &str) -> Result<Value, TacosError> {
        let url = self.type_url(type_id);
        let body = self.get_text(&url).await?;
        serde_json::from_str(&body)
            .map_err(|e| TacosError::Conversion(format!("{url} did not return JSON: {e}")))
    }

    /// Resolve `Schema.subCond` of arrays and `Schema.Properties[].Type` of
    /// objects, depth first. Members that are already objects are left alone.
    pub fn resolve_subtypes<'a>(
        &'a self,
        mut data: Value,
        depth: usize,
    ) -> BoxFuture<'a, Result<Value, TacosError>> {
        Box::pin(async move {
            if depth > MAX_RESOLVE_DEPTH {
                return Err(TacosError::Conversion(format!(
                    "type nesting deeper than {MAX_RESOLVE_DEPTH} levels"
                )));
            }
            let name = data
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("<unnamed>")
                .to_string();
            let Some(schema) = data
                .pointer_mut("/content/Schema")
                .and_then(Value::as_object_mut)
            else {
                return Ok(data);
            };

            if schema.get("Type").and_then(Value::as_str) == Some("Array") {
                if let Some(link) = schema.get("subCond").and_then(Value::as_str) {
                    let link = link.to_string();
                    log::info!("Fetching \"{name}\": \"{}\"", self.type_url(&link));
                    let fetched = self.fetch_record(&link).await?;
                    let resolved = self.resolve_subtypes(fetched, depth + 1).await?;
                    schema.insert("Identifier".into(), Value::String(link));
                    schema.insert("subCond".into(), resolved);
                }
            }

            if let Some(props) = schema.get_mut("Properties").and_then(Value::as_array_mut) {
                for item in props.iter_mut() {
                    let Some(link) = item.get("Type").and_then(Value::as_str) else {
                        continue;
                    };
                    let link = link.to_string();
                    let member = item.get("Name").and_then(Value::as_str).unwrap_or("");
                    log::info!("Fetching \"{member}\": \"{}\"", self.type_url(&link));
                    let fetched = self.fetch_record(&link).await?;
                    item["Type"] = self.resolve_subtypes(fetched, depth + 1).await?;
                }
            }

            Ok(data)
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, TacosError> {
        log::debug!("GET {url}");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TacosError::network(url, e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| TacosError::network(url, e))?;
        if !status.is_success() {
            log::error!("Request to {url} failed with {status}");
            return Err(TacosError::from_status(url, status, &body));
        }
        Ok(body)
    }
}
