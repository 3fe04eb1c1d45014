//! DataCite REST client.
//!
//! API: https://api.datacite.org/dois/{urlEncodedDoi}

use async_trait::async_trait;
use lusocite_common::sandbox::SandboxClient as Client;
use lusocite_common::Result;
use serde_json::Value;
use tracing::instrument;

const DC_DOIS_URL: &str = "https://api.datacite.org/dois";
const REGISTRY:    &str = "datacite";

#[async_trait]
pub trait DataCiteApi: Send + Sync {
    async fn doi(&self, doi: &str) -> Result<Value>;
}

pub struct DataCiteClient {
    client: Client,
}

impl DataCiteClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Form-encode the whole DOI, slashes included.
pub fn encode_doi(doi: &str) -> String {
    url::form_urlencoded::byte_serialize(doi.as_bytes()).collect()
}

#[async_trait]
impl DataCiteApi for DataCiteClient {
    #[instrument(skip(self))]
    async fn doi(&self, doi: &str) -> Result<Value> {
        let url = format!("{DC_DOIS_URL}/{}", encode_doi(doi));
        self.client.get_json(&url, REGISTRY).await
    }
}

/// A DataCite response is usable only if it has a `data` member.
pub fn has_data(body: &Value) -> bool {
    body.get("data").is_some()
}
