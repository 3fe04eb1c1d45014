//! OpenCitations index client.
//!
//! API: https://opencitations.net/index/api/v1/{citations,metadata}/{doi}
//! `citations` lists the works citing a DOI; `metadata` describes up to a
//! few dozen DOIs joined with `__`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use lusocite_common::sandbox::SandboxClient as Client;
use lusocite_common::{LusociteError, Result};
use serde_json::Value;
use tracing::instrument;

use crate::models::CitationSet;

const OC_API_BASE: &str = "https://opencitations.net/index/api/v1";
const REGISTRY:    &str = "opencitations";

/// Most DOIs sent in one metadata request.
pub const METADATA_BATCH: usize = 50;

#[async_trait]
pub trait OpenCitationsApi: Send + Sync {
    async fn citations(&self, doi: &str) -> Result<Value>;
    async fn metadata(&self, dois: &[String]) -> Result<Value>;
}

pub struct OpenCitationsClient {
    client: Client,
}

impl OpenCitationsClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OpenCitationsApi for OpenCitationsClient {
    #[instrument(skip(self))]
    async fn citations(&self, doi: &str) -> Result<Value> {
        let url = format!("{OC_API_BASE}/citations/{doi}");
        self.client.get_json(&url, REGISTRY).await
    }

    #[instrument(skip(self), fields(n = dois.len()))]
    async fn metadata(&self, dois: &[String]) -> Result<Value> {
        let url = format!("{OC_API_BASE}/metadata/{}", dois.join("__"));
        self.client.get_json(&url, REGISTRY).await
    }
}

/// Citing ids of a `citations` response.
///
/// Each entry's `citing` field holds `;`-separated tokens shaped
/// `"prefix => id"`; the right-hand side is taken, trimmed and lowercased.
/// Tokens without an arrow are taken whole.
pub fn parse_citing(body: &Value) -> Result<CitationSet> {
    let entries = body
        .as_array()
        .ok_or_else(|| LusociteError::malformed(REGISTRY, "citations response is not an array"))?;

    let mut citing = CitationSet::new();
    for entry in entries {
        let Some(field) = entry["citing"].as_str() else { continue };
        for token in field.split(';') {
            let id = match token.split("=>").nth(1) {
                Some(rhs) => rhs,
                None      => token,
            };
            let id = id.trim().to_lowercase();
            if !id.is_empty() {
                citing.insert(id);
            }
        }
    }
    Ok(citing)
}

/// Metadata objects of a `metadata` response, keyed by lowercase DOI.
pub fn parse_metadata(body: &Value) -> Result<BTreeMap<String, Value>> {
    let entries = body
        .as_array()
        .ok_or_else(|| LusociteError::malformed(REGISTRY, "metadata response is not an array"))?;

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let doi = entry["doi"].as_str()?.trim().to_lowercase();
            (!doi.is_empty()).then(|| (doi, entry.clone()))
        })
        .collect())
}
