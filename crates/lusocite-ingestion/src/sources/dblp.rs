//! DBLP client: conference publication search and person records.
//!
//! Endpoints used:
//!   search: https://dblp.org/search/publ/api?q=stream:conf/{alias}:&format=json&h=&f=
//!   person: https://dblp.org/pid/{pid}.xml

use async_trait::async_trait;
use lusocite_common::sandbox::SandboxClient as Client;
use lusocite_common::{LusociteError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::models::Publication;

const DBLP_SEARCH_URL: &str = "https://dblp.org/search/publ/api";
const DBLP_PID_URL:    &str = "https://dblp.org/pid";
const REGISTRY:        &str = "dblp";

/// Largest page the search API serves.
pub const PAGE_SIZE: usize = 100;

#[async_trait]
pub trait DblpApi: Send + Sync {
    /// One page of a conference stream search (`h` hits from offset `f`).
    async fn search_page(&self, alias: &str, hits: usize, first: usize) -> Result<Value>;

    /// The XML person record of an author pid.
    async fn person_xml(&self, pid: &str) -> Result<String>;
}

pub struct DblpClient {
    client: Client,
}

impl DblpClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

pub fn search_url(alias: &str, hits: usize, first: usize) -> String {
    format!("{DBLP_SEARCH_URL}?q=stream:conf/{alias}:&format=json&h={hits}&f={first}")
}

#[async_trait]
impl DblpApi for DblpClient {
    #[instrument(skip(self))]
    async fn search_page(&self, alias: &str, hits: usize, first: usize) -> Result<Value> {
        self.client.get_json(&search_url(alias, hits, first), REGISTRY).await
    }

    #[instrument(skip(self))]
    async fn person_xml(&self, pid: &str) -> Result<String> {
        let url = format!("{DBLP_PID_URL}/{pid}.xml");
        self.client.get_text(&url, "application/xml").await
    }
}

/// `result.hits.@total`, which DBLP sends as a string.
pub fn parse_total(body: &Value) -> Result<usize> {
    let total = &body["result"]["hits"]["@total"];
    let parsed = match total {
        Value::String(s) => s.trim().parse::<usize>().ok(),
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        _ => None,
    };
    parsed.ok_or_else(|| LusociteError::malformed(REGISTRY, format!("bad hit count {total}")))
}

/// The `hit` array of a non-empty search page.
pub fn parse_hits(body: &Value) -> Result<Vec<Publication>> {
    let hits = body["result"]["hits"]["hit"]
        .as_array()
        .ok_or_else(|| LusociteError::malformed(REGISTRY, "search page without hit array"))?;
    hits.iter()
        .map(|hit| {
            serde_json::from_value(hit.clone())
                .map_err(|e| LusociteError::malformed(REGISTRY, format!("unreadable hit: {e}")))
        })
        .collect()
}

/// Texts of `person/note[@type="affiliation"]` in a DBLP person record.
pub fn parse_affiliations(xml: &str) -> Result<Vec<String>> {
    let mut affiliations = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut person_depth: Option<usize> = None;
    let mut in_note = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                match e.name().as_ref() {
                    b"person" if depth == 2 => person_depth = Some(depth),
                    b"note" if person_depth == Some(depth - 1) => {
                        let kind = e
                            .try_get_attribute("type")
                            .map_err(|e| LusociteError::Xml(e.to_string()))?;
                        if let Some(kind) = kind {
                            in_note = kind.value.as_ref() == b"affiliation";
                            text.clear();
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) if in_note => {
                let chunk = e.unescape().map_err(|e| LusociteError::Xml(e.to_string()))?;
                text.push_str(&chunk);
            }
            Ok(Event::End(ref e)) => {
                match e.name().as_ref() {
                    b"note" if in_note => {
                        in_note = false;
                        if !text.is_empty() {
                            affiliations.push(std::mem::take(&mut text));
                        }
                    }
                    b"person" if person_depth == Some(depth) => person_depth = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(LusociteError::Xml(e.to_string())),
            _ => {}
        }
    }

    debug!(n = affiliations.len(), "Parsed DBLP affiliations");
    Ok(affiliations)
}
