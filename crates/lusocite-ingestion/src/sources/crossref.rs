//! CrossRef client.
//!
//! Used for two purposes:
//! 1. Asking which registration agency owns a DOI
//! 2. Fetching full work metadata (authors, affiliations, ORCIDs)
//!
//! API: https://api.crossref.org/works/{doi}[/agency]
//! Polite pool: the shared client sends a User-Agent with mailto.

use async_trait::async_trait;
use lusocite_common::sandbox::SandboxClient as Client;
use lusocite_common::{LusociteError, Result};
use serde_json::Value;
use tracing::instrument;

use crate::models::Agency;

const CR_WORKS_URL: &str = "https://api.crossref.org/works";
const REGISTRY:     &str = "crossref";

#[async_trait]
pub trait CrossrefApi: Send + Sync {
    async fn agency(&self, doi: &str) -> Result<Value>;
    async fn work(&self, doi: &str) -> Result<Value>;
}

pub struct CrossRefClient {
    client: Client,
}

impl CrossRefClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CrossrefApi for CrossRefClient {
    #[instrument(skip(self))]
    async fn agency(&self, doi: &str) -> Result<Value> {
        let url = format!("{CR_WORKS_URL}/{doi}/agency");
        self.client.get_json(&url, REGISTRY).await
    }

    #[instrument(skip(self))]
    async fn work(&self, doi: &str) -> Result<Value> {
        let url = format!("{CR_WORKS_URL}/{doi}");
        self.client.get_json(&url, REGISTRY).await
    }
}

/// Crossref wraps every answer in `{status, message}`.
pub fn is_ok(body: &Value) -> bool {
    body["status"].as_str() == Some("ok")
}

/// `message.agency.id` of an agency lookup.
pub fn parse_agency(body: &Value) -> Result<Agency> {
    if !is_ok(body) {
        return Err(LusociteError::malformed(
            REGISTRY,
            format!("agency lookup status {}", body["status"]),
        ));
    }
    body["message"]["agency"]["id"]
        .as_str()
        .map(Agency::parse)
        .ok_or_else(|| LusociteError::malformed(REGISTRY, "agency lookup without message.agency.id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_agency() {
        let body = json!({
            "status": "ok",
            "message-type": "work-agency",
            "message": { "DOI": "10.5281/zenodo.1", "agency": { "id": "datacite", "label": "DataCite" } }
        });
        assert_eq!(parse_agency(&body).unwrap(), Agency::DataCite);
    }

    #[test]
    fn test_parse_agency_keeps_other_agencies() {
        let body = json!({ "status": "ok", "message": { "agency": { "id": "medra" } } });
        assert_eq!(parse_agency(&body).unwrap(), Agency::Other("medra".into()));
    }

    #[test]
    fn test_parse_agency_rejects_failed_status() {
        let body = json!({ "status": "failed", "message": "Resource not found." });
        assert!(matches!(parse_agency(&body), Err(LusociteError::Malformed { .. })));
    }
}
