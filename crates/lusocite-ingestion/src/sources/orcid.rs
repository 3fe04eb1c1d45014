//! ORCID public API client.
//!
//! Token:  POST https://orcid.org/oauth/token (client credentials, /read-public)
//! Record: GET  https://pub.orcid.org/v3.0/{orcid}/{section}
//!
//! The token is exchanged once and reused for the rest of the process.
//! Without credentials the public API is queried anonymously.

use async_trait::async_trait;
use lusocite_common::sandbox::{ensure_success, SandboxClient as Client};
use lusocite_common::{LusociteError, Result};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::models::OrcidSection;

const ORCID_TOKEN_URL:         &str = "https://orcid.org/oauth/token";
const ORCID_API_URL:           &str = "https://pub.orcid.org/v3.0";
const ORCID_SANDBOX_TOKEN_URL: &str = "https://sandbox.orcid.org/oauth/token";
const ORCID_SANDBOX_API_URL:   &str = "https://pub.sandbox.orcid.org/v3.0";
const ORCID_JSON:              &str = "application/orcid+json";
const REGISTRY:                &str = "orcid";

#[async_trait]
pub trait OrcidApi: Send + Sync {
    async fn read_section(&self, orcid: &str, section: OrcidSection) -> Result<Value>;
}

/// Externally supplied client credentials.
#[derive(Debug, Clone, Default)]
pub struct OrcidCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    pub sandbox: bool,
}

pub struct OrcidClient {
    client: Client,
    credentials: OrcidCredentials,
    token: OnceCell<Option<SecretString>>,
}

impl OrcidClient {
    pub fn new(client: Client, credentials: OrcidCredentials) -> Self {
        Self { client, credentials, token: OnceCell::new() }
    }

    fn api_url(&self) -> &'static str {
        if self.credentials.sandbox { ORCID_SANDBOX_API_URL } else { ORCID_API_URL }
    }

    fn token_url(&self) -> &'static str {
        if self.credentials.sandbox { ORCID_SANDBOX_TOKEN_URL } else { ORCID_TOKEN_URL }
    }

    async fn token(&self) -> Result<Option<&SecretString>> {
        let token = self.token.get_or_try_init(|| self.exchange_token()).await?;
        Ok(token.as_ref())
    }

    async fn exchange_token(&self) -> Result<Option<SecretString>> {
        let (Some(id), Some(secret)) = (&self.credentials.client_id, &self.credentials.client_secret) else {
            info!("No ORCID credentials configured, using the public API anonymously");
            return Ok(None);
        };

        let url = self.token_url();
        let resp = self.client
            .post(url)?
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id",     id.as_str()),
                ("client_secret", secret.expose_secret()),
                ("grant_type",    "client_credentials"),
                ("scope",         "/read-public"),
            ])
            .send()
            .await?;
        let body: Value = ensure_success(url, resp)?
            .json()
            .await
            .map_err(|e| LusociteError::malformed(REGISTRY, e.to_string()))?;

        let token = parse_token(&body)?;
        debug!("Exchanged ORCID search token");
        Ok(Some(token))
    }
}

#[async_trait]
impl OrcidApi for OrcidClient {
    #[instrument(skip(self), fields(section = section.as_str()))]
    async fn read_section(&self, orcid: &str, section: OrcidSection) -> Result<Value> {
        let url = format!("{}/{orcid}/{}", self.api_url(), section.as_str());
        let mut req = self.client.get(&url)?.header(reqwest::header::ACCEPT, ORCID_JSON);
        if let Some(token) = self.token().await? {
            req = req.bearer_auth(token.expose_secret());
        }
        let resp = ensure_success(&url, req.send().await?)?;
        resp.json::<Value>()
            .await
            .map_err(|e| LusociteError::malformed(REGISTRY, e.to_string()))
    }
}

pub fn parse_token(body: &Value) -> Result<SecretString> {
    body["access_token"]
        .as_str()
        .map(|t| SecretString::from(t.to_string()))
        .ok_or_else(|| LusociteError::malformed(REGISTRY, "token response without access_token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_token() {
        let body = json!({ "access_token": "abc", "token_type": "bearer", "scope": "/read-public" });
        assert_eq!(parse_token(&body).unwrap().expose_secret(), "abc");
        assert!(parse_token(&json!({ "error": "invalid_client" })).is_err());
    }

    #[tokio::test]
    async fn test_no_credentials_means_anonymous() {
        let client = Client::new("lusocite-test", None).unwrap();
        let orcid = OrcidClient::new(client, OrcidCredentials::default());
        assert!(orcid.token().await.unwrap().is_none());
    }
}
