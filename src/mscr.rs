//! Client for the Metadata Schema and Crosswalk Registry (MSCR).

use crate::config::{Endpoint, SchemaMetadata};
use crate::constants::{MSCR_DTR_TYPES_PATH, MSCR_SCHEMA_FULL_PATH, MSCR_TIMEOUT_SECS};
use crate::error::TacosError;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    multipart::{Form, Part},
    Client, RequestBuilder,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// File name MSCR sees for an uploaded schema document.
pub const UPLOAD_FILE_NAME: &str = "schema.json";

/// A DTR type to attach to an MSCR schema, optionally pinned to an element.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TypeBinding {
    pub pid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Body of an `add-types` request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AddTypesRequest {
    pub types: Vec<TypeBinding>,
}

/// What MSCR returned for a registration.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub schema_id: String,
    pub status: Option<String>,
}

impl Registration {
    /// MSCR deployments name the identifier differently; accept the known spellings.
    pub fn from_response(body: &Value) -> Option<Self> {
        let schema_id = ["schemaId", "pid", "id"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))?
            .to_string();
        let status = ["status", "state"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string);
        Some(Registration { schema_id, status })
    }
}

/// Status line and body of a mutation MSCR accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct MscrResponse {
    pub status: u16,
    pub body: String,
}

pub struct MscrClient {
    pub base_url: String,
    client: Client,
}

impl MscrClient {
    pub fn new(endpoint: &Endpoint) -> Result<Self, TacosError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &endpoint.token {
            let hv = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                TacosError::Config("MSCR token contains invalid header characters".to_string())
            })?;
            headers.insert(AUTHORIZATION, hv);
        }

        let client = Client::builder()
            .user_agent(concat!("tacos/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(MSCR_TIMEOUT_SECS))
            .build()
            .map_err(|e| TacosError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(MscrClient {
            base_url: endpoint.url.clone(),
            client,
        })
    }

    pub fn register_url(&self) -> String {
        format!("{}{}", self.base_url, MSCR_SCHEMA_FULL_PATH)
    }

    pub fn add_types_url(&self, schema_id: &str) -> String {
        format!("{}{}{}", self.base_url, MSCR_DTR_TYPES_PATH, schema_id)
    }

    /// Upload a schema document with its metadata as a multipart form.
    ///
    /// `document` must already be valid JSON; it is re-serialised pretty-printed.
    pub async fn register_schema(
        &self,
        document: &Value,
        metadata: &SchemaMetadata,
    ) -> Result<Registration, TacosError> {
        let url = self.register_url();
        let (metadata_json, file_json) = registration_parts(document, metadata)?;
        log::debug!("metadata part: {metadata_json}");
        log::debug!("file part ({UPLOAD_FILE_NAME}): {file_json}");

        let file = Part::bytes(file_json.into_bytes())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("application/json")
            .map_err(|e| TacosError::Config(format!("bad upload content type: {e}")))?;
        let form = Form::new()
            .part("metadata", Part::text(metadata_json))
            .part("file", file);

        log::info!("Register the JSON-Schema to MSCR {url}");
        let resp = self.send(&url, self.client.put(&url).multipart(form)).await?;
        let parsed: Value = serde_json::from_str(&resp.body).map_err(|e| {
            TacosError::UnexpectedStatus {
                url: url.clone(),
                status: resp.status,
                body: format!("response is not JSON: {e}"),
            }
        })?;
        Registration::from_response(&parsed).ok_or_else(|| TacosError::UnexpectedStatus {
            url,
            status: resp.status,
            body: "response carries no schema identifier".to_string(),
        })
    }

    /// Attach DTR types to `schema_id` in one request.
    pub async fn add_types(
        &self,
        schema_id: &str,
        request: &AddTypesRequest,
    ) -> Result<MscrResponse, TacosError> {
        if request.types.is_empty() {
            return Err(TacosError::Validation(
                "no type identifiers to attach".to_string(),
            ));
        }
        let url = self.add_types_url(schema_id);
        log::info!("Attach {} DTR types to {url}", request.types.len());
        self.send(&url, self.client.patch(&url).json(request)).await
    }

    async fn send(&self, url: &str, req: RequestBuilder) -> Result<MscrResponse, TacosError> {
        let resp = req.send().await.map_err(|e| TacosError::network(url, e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| TacosError::network(url, e))?;
        if !status.is_success() {
            log::error!("MSCR answered {status}: {body}");
            return Err(TacosError::from_status(url, status, &body));
        }
        Ok(MscrResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// The `metadata` and `file` parts of a registration, as sent.
pub fn registration_parts(
    document: &Value,
    metadata: &SchemaMetadata,
) -> Result<(String, String), TacosError> {
    Ok((to_pretty(metadata)?, to_pretty(document)?))
}

fn to_pretty<T: Serialize>(value: &T) -> Result<String, TacosError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| TacosError::Validation(format!("cannot serialise request: {e}")))
}
