use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::error::{LusociteError, Result};

/// Registry hosts the pipeline is allowed to talk to.
const DEFAULT_ALLOWLIST: &[&str] = &[
    "dblp.org",                // DBLP search + person records
    "opencitations.net",       // OpenCitations index
    "api.crossref.org",        // Crossref works + agency
    "api.datacite.org",        // DataCite DOIs
    "api.semanticscholar.org", // Semantic Scholar papers
    "orcid.org",               // ORCID OAuth + pub API (pub.orcid.org)
    "sandbox.orcid.org",       // ORCID sandbox
];

/// An HTTP client capped to the bibliographic registries.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Build a client with the default registry allowlist.
    ///
    /// `timeout` is left unset unless given: a hung registry stalls the run,
    /// which is acceptable for an operator-driven batch tool.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = ClientBuilder::new().user_agent(user_agent.to_string());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            allowlist: DEFAULT_ALLOWLIST.iter().map(|d| d.to_string()).collect(),
        })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Exact host or any subdomain of an allowed host.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else { return false };
        let Some(host) = parsed.host_str() else { return false };
        self.allowlist
            .iter()
            .any(|allowed| host == allowed || host.ends_with(&format!(".{allowed}")))
    }

    pub fn get(&self, url: &str) -> Result<RequestBuilder> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<RequestBuilder> {
        self.check(url)?;
        Ok(self.client.post(url))
    }

    /// GET `url` expecting a JSON body. Non-2xx and undecodable bodies are errors.
    pub async fn get_json(&self, url: &str, registry: &'static str) -> Result<serde_json::Value> {
        let resp = self.get(url)?
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let resp = ensure_success(url, resp)?;
        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| LusociteError::malformed(registry, e.to_string()))
    }

    /// GET `url` expecting a text (XML) body.
    pub async fn get_text(&self, url: &str, accept: &str) -> Result<String> {
        let resp = self.get(url)?
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await?;
        Ok(ensure_success(url, resp)?.text().await?)
    }

    fn check(&self, url: &str) -> Result<()> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(LusociteError::Sandbox(url.to_string()))
        }
    }
}

/// Turn a non-2xx response into a `Status` error carrying the URL.
pub fn ensure_success(url: &str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(LusociteError::Status { url: url.to_string(), status: status.as_u16() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_hosts_are_allowed() {
        let client = SandboxClient::new("lusocite-test", None).unwrap();
        assert!(client.is_allowed("https://api.crossref.org/works/10.1000/x"));
        assert!(client.is_allowed("https://pub.orcid.org/v3.0/0000-0002-1825-0097/person"));
        assert!(client.is_allowed("https://dblp.org/pid/o/JoniceOliveira.xml"));
    }

    #[test]
    fn test_other_hosts_are_refused() {
        let client = SandboxClient::new("lusocite-test", None).unwrap();
        assert!(!client.is_allowed("https://example.com/"));
        assert!(!client.is_allowed("https://evilcrossref.org/works"));
        assert!(!client.is_allowed("not a url"));
        assert!(matches!(client.get("https://example.com/"), Err(LusociteError::Sandbox(_))));
    }
}
