//! Semantic Scholar client.
//!
//! API: https://api.semanticscholar.org/v1/paper/{doiOrPaperId}
//! The same response carries the paper's own metadata and its `citations`.

use async_trait::async_trait;
use lusocite_common::sandbox::SandboxClient as Client;
use lusocite_common::Result;
use serde_json::Value;
use tracing::{instrument, warn};

use crate::models::{is_test_doi, CitationSet};

const S2_PAPER_URL: &str = "https://api.semanticscholar.org/v1/paper";
const REGISTRY:     &str = "semanticscholar";

/// Public page of a Semantic Scholar paper, for operator follow-up.
pub fn paper_page(paper_id: &str) -> String {
    format!("https://www.semanticscholar.org/paper/{paper_id}")
}

#[async_trait]
pub trait SemanticScholarApi: Send + Sync {
    async fn paper(&self, id: &str) -> Result<Value>;
}

pub struct SemanticScholarClient {
    client: Client,
}

impl SemanticScholarClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SemanticScholarApi for SemanticScholarClient {
    #[instrument(skip(self))]
    async fn paper(&self, id: &str) -> Result<Value> {
        let url = format!("{S2_PAPER_URL}/{id}");
        self.client.get_json(&url, REGISTRY).await
    }
}

/// Citing works split by identifier kind.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SemanticScholarCitations {
    pub dois: CitationSet,
    /// Citing works without a DOI, by lowercase paper id.
    pub paper_ids: CitationSet,
    /// Test-prefix DOIs that were dropped.
    pub skipped: Vec<String>,
}

impl SemanticScholarCitations {
    pub fn is_empty(&self) -> bool {
        self.dois.is_empty() && self.paper_ids.is_empty()
    }
}

pub fn parse_citations(body: &Value) -> SemanticScholarCitations {
    let mut out = SemanticScholarCitations::default();
    let Some(citations) = body["citations"].as_array() else { return out };

    for citation in citations {
        match citation["doi"].as_str().filter(|d| !d.is_empty() && *d != "null") {
            Some(doi) if is_test_doi(doi) => {
                warn!(doi, registry = REGISTRY, "Skipping test-prefix citing DOI");
                out.skipped.push(doi.to_string());
            }
            Some(doi) => {
                out.dois.insert(doi.to_lowercase());
            }
            None => {
                if let Some(paper_id) = citation["paperId"].as_str() {
                    out.paper_ids.insert(paper_id.to_lowercase());
                }
            }
        }
    }
    out
}

/// A paper response is usable only if it names its own paper id.
pub fn is_paper(body: &Value) -> bool {
    body.get("paperId").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_citations_splits_dois_and_paper_ids() {
        let body = json!({
            "paperId": "self",
            "citations": [
                { "doi": "10.1145/ABC", "paperId": "p1" },
                { "doi": null, "paperId": "9F8E7D" },
                { "doi": "null", "paperId": "AAAA" },
                { "doi": "10.5555/abc123", "paperId": "p2" },
                { "paperId": "bbbb" }
            ]
        });
        let parsed = parse_citations(&body);
        assert_eq!(parsed.dois.iter().collect::<Vec<_>>(), vec!["10.1145/abc"]);
        assert_eq!(parsed.paper_ids.iter().collect::<Vec<_>>(), vec!["9f8e7d", "aaaa", "bbbb"]);
        assert_eq!(parsed.skipped, vec!["10.5555/abc123".to_string()]);
    }

    #[test]
    fn test_parse_citations_without_array_is_empty() {
        assert!(parse_citations(&json!({ "error": "Not found" })).is_empty());
    }
}
