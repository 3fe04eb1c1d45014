//! lusocite-test-utils: In-memory registries, resolvers and JSON fixtures
//! for integration tests.

pub mod fixtures;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use lusocite_common::resolver::{CannedResolver, Subject, UnknownResolver};
use lusocite_common::{LusociteError, Result};
use lusocite_ingestion::language::LanguageModel;
use lusocite_ingestion::models::OrcidSection;
use lusocite_ingestion::sources::{
    CrossrefApi, DataCiteApi, DblpApi, OpenCitationsApi, OrcidApi, Registries, SemanticScholarApi,
};
use lusocite_ingestion::{Caches, Context};
use serde_json::Value;

pub use pretty_assertions;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── Fake registry ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Canned {
    Json(Value),
    Text(String),
    Status(u16),
}

/// Every registry at once, answering from a table keyed by call signature.
///
/// Unregistered calls answer 404. Every call is recorded, so tests can
/// assert on exactly which requests a pipeline step made.
#[derive(Debug, Default)]
pub struct FakeRegistry {
    responses: HashMap<String, Canned>,
    calls: Mutex<Vec<String>>,
}

pub fn search_key(alias: &str, hits: usize, first: usize) -> String {
    format!("dblp.search:{alias}:{hits}:{first}")
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn json(mut self, key: String, body: Value) -> Self {
        self.responses.insert(key, Canned::Json(body));
        self
    }

    /// Answer `key` (as recorded in `calls()`) with an HTTP error status.
    pub fn status(mut self, key: &str, status: u16) -> Self {
        self.responses.insert(key.to_string(), Canned::Status(status));
        self
    }

    pub fn search_page(self, alias: &str, hits: usize, first: usize, body: Value) -> Self {
        self.json(search_key(alias, hits, first), body)
    }

    pub fn person_xml(mut self, pid: &str, xml: &str) -> Self {
        self.responses.insert(format!("dblp.person:{pid}"), Canned::Text(xml.to_string()));
        self
    }

    pub fn oc_citations(self, doi: &str, body: Value) -> Self {
        self.json(format!("opencitations.citations:{doi}"), body)
    }

    pub fn oc_metadata(self, dois: &[&str], body: Value) -> Self {
        self.json(format!("opencitations.metadata:{}", dois.join("__")), body)
    }

    pub fn s2_paper(self, id: &str, body: Value) -> Self {
        self.json(format!("semanticscholar.paper:{id}"), body)
    }

    pub fn crossref_agency(self, doi: &str, body: Value) -> Self {
        self.json(format!("crossref.agency:{doi}"), body)
    }

    pub fn crossref_work(self, doi: &str, body: Value) -> Self {
        self.json(format!("crossref.work:{doi}"), body)
    }

    pub fn datacite(self, doi: &str, body: Value) -> Self {
        self.json(format!("datacite.doi:{doi}"), body)
    }

    pub fn orcid(self, orcid: &str, section: OrcidSection, body: Value) -> Self {
        self.json(format!("orcid.{}:{orcid}", section.as_str()), body)
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Calls whose signature starts with `prefix` (e.g. `"crossref."`).
    pub fn calls_to(&self, prefix: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn into_registries(self) -> (Arc<FakeRegistry>, Registries) {
        let fake = Arc::new(self);
        let registries = Registries::uniform(fake.clone());
        (fake, registries)
    }

    fn answer(&self, key: String) -> Result<Canned> {
        lock(&self.calls).push(key.clone());
        match self.responses.get(&key) {
            Some(Canned::Status(status)) => Err(LusociteError::Status { url: key, status: *status }),
            Some(canned) => Ok(canned.clone()),
            None => Err(LusociteError::Status { url: key, status: 404 }),
        }
    }

    fn answer_json(&self, key: String) -> Result<Value> {
        match self.answer(key)? {
            Canned::Json(body) => Ok(body),
            Canned::Text(text) => Ok(Value::String(text)),
            Canned::Status(_) => unreachable!("status answers are returned as errors"),
        }
    }
}

#[async_trait]
impl DblpApi for FakeRegistry {
    async fn search_page(&self, alias: &str, hits: usize, first: usize) -> Result<Value> {
        self.answer_json(search_key(alias, hits, first))
    }

    async fn person_xml(&self, pid: &str) -> Result<String> {
        match self.answer(format!("dblp.person:{pid}"))? {
            Canned::Text(xml) => Ok(xml),
            Canned::Json(body) => Ok(body.to_string()),
            Canned::Status(_) => unreachable!("status answers are returned as errors"),
        }
    }
}

#[async_trait]
impl OpenCitationsApi for FakeRegistry {
    async fn citations(&self, doi: &str) -> Result<Value> {
        self.answer_json(format!("opencitations.citations:{doi}"))
    }

    async fn metadata(&self, dois: &[String]) -> Result<Value> {
        self.answer_json(format!("opencitations.metadata:{}", dois.join("__")))
    }
}

#[async_trait]
impl SemanticScholarApi for FakeRegistry {
    async fn paper(&self, id: &str) -> Result<Value> {
        self.answer_json(format!("semanticscholar.paper:{id}"))
    }
}

#[async_trait]
impl CrossrefApi for FakeRegistry {
    async fn agency(&self, doi: &str) -> Result<Value> {
        self.answer_json(format!("crossref.agency:{doi}"))
    }

    async fn work(&self, doi: &str) -> Result<Value> {
        self.answer_json(format!("crossref.work:{doi}"))
    }
}

#[async_trait]
impl DataCiteApi for FakeRegistry {
    async fn doi(&self, doi: &str) -> Result<Value> {
        self.answer_json(format!("datacite.doi:{doi}"))
    }
}

#[async_trait]
impl OrcidApi for FakeRegistry {
    async fn read_section(&self, orcid: &str, section: OrcidSection) -> Result<Value> {
        self.answer_json(format!("orcid.{}:{orcid}", section.as_str()))
    }
}

// ── Resolver / language fakes ───────────────────────────────────────────────

/// A `CannedResolver` that stays inspectable after being boxed into a context.
#[derive(Debug, Clone, Default)]
pub struct SharedResolver(Arc<Mutex<CannedResolver>>);

impl SharedResolver {
    pub fn new(resolver: CannedResolver) -> Self {
        Self(Arc::new(Mutex::new(resolver)))
    }

    pub fn times_asked(&self, text: &str) -> usize {
        lock(&self.0).times_asked(text)
    }

    pub fn asked(&self) -> Vec<(Subject, String)> {
        lock(&self.0).asked().to_vec()
    }
}

impl UnknownResolver for SharedResolver {
    fn resolve(&mut self, subject: Subject, text: &str) -> Result<Option<bool>> {
        lock(&self.0).resolve(subject, text)
    }
}

/// Labels titles from a table; everything else is English.
#[derive(Debug, Default)]
pub struct TableLanguage {
    labels: HashMap<String, String>,
    calls: Mutex<usize>,
}

impl TableLanguage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, text: &str, label: &str) -> Self {
        self.labels.insert(text.to_string(), label.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        *lock(&self.calls)
    }
}

impl LanguageModel for TableLanguage {
    fn predict(&self, text: &str) -> String {
        *lock(&self.calls) += 1;
        self.labels
            .get(text)
            .cloned()
            .unwrap_or_else(|| "__label__en".to_string())
    }
}

// ── Contexts ────────────────────────────────────────────────────────────────

/// Context over in-memory caches.
pub fn memory_context(registries: Registries, resolver: SharedResolver) -> Context {
    Context::new(Caches::in_memory(), registries, Box::new(resolver))
}

/// Context over caches stored in `data_dir`.
pub fn disk_context(data_dir: &Path, registries: Registries, resolver: SharedResolver) -> Context {
    let caches = Caches::open(data_dir).expect("caches open");
    Context::new(caches, registries, Box::new(resolver))
}
