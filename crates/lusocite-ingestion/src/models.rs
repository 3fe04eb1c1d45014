//! Data models for the ingestion pipeline.
//!
//! Every model here is persisted in one of the JSON maps, so each keeps the
//! exact on-disk shape of the registry or cache it comes from and carries a
//! flattened `extra` map for fields it does not interpret.

use std::collections::BTreeSet;

use lusocite_common::Relation;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix of Crossref's test registrant; its DOIs never resolve.
pub const TEST_DOI_PREFIX: &str = "10.5555";

/// Citing DOIs / Semantic Scholar paper ids of one cited publication.
pub type CitationSet = BTreeSet<String>;

pub fn is_test_doi(doi: &str) -> bool {
    doi.starts_with(TEST_DOI_PREFIX)
}

/// Registered DOIs start with the `10.` directory indicator; anything else
/// reaching the pipeline is a native Semantic Scholar paper id.
pub fn is_registered_doi(key: &str) -> bool {
    key.starts_with("10.")
}

// ── Conference snapshot ─────────────────────────────────────────────────────

/// One DBLP search hit, plus the language tag added on download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub info: PublicationInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<DblpAuthors>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// DBLP renders a lone author as an object and several as an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(item)   => std::slice::from_ref(item).iter(),
            OneOrMany::Many(items) => items.iter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DblpAuthors {
    pub author: OneOrMany<DblpAuthor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DblpAuthor {
    #[serde(rename = "@pid", default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Publication {
    pub fn doi(&self) -> Option<&str> {
        self.info.doi.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Lowercase DOI used as key in the citation and metadata maps.
    pub fn doi_key(&self) -> Option<String> {
        self.doi().map(|d| d.trim().to_lowercase())
    }

    pub fn author_pids(&self) -> Vec<&str> {
        self.info
            .authors
            .as_ref()
            .map(|a| a.author.iter().filter_map(|x| x.pid.as_deref()).collect())
            .unwrap_or_default()
    }

    pub fn year(&self) -> &str {
        &self.info.year
    }
}

// ── DOI metadata ────────────────────────────────────────────────────────────

/// Registry authoritative for a DOI's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Agency {
    Crossref,
    DataCite,
    SemanticScholar,
    /// Any other registration agency Crossref reports (mEDRA, JaLC, …).
    Other(String),
}

impl Agency {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "crossref"        => Agency::Crossref,
            "datacite"        => Agency::DataCite,
            "semanticscholar" => Agency::SemanticScholar,
            other             => Agency::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Agency::Crossref        => "crossref",
            Agency::DataCite        => "datacite",
            Agency::SemanticScholar => "semanticscholar",
            Agency::Other(name)     => name,
        }
    }
}

impl From<String> for Agency {
    fn from(s: String) -> Self {
        Agency::parse(&s)
    }
}

impl From<Agency> for String {
    fn from(a: Agency) -> Self {
        a.as_str().to_string()
    }
}

impl std::fmt::Display for Agency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which registry a record is resolved to, and the raw metadata fetched from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Registration {
    #[default]
    Unresolved,
    Crossref { metadata: Option<Value> },
    DataCite { metadata: Option<Value> },
    SemanticScholar { metadata: Option<Value> },
    Unrecognised { agency: String, metadata: Option<Value> },
}

impl Registration {
    fn new(agency: Agency, metadata: Option<Value>) -> Self {
        match agency {
            Agency::Crossref        => Registration::Crossref { metadata },
            Agency::DataCite        => Registration::DataCite { metadata },
            Agency::SemanticScholar => Registration::SemanticScholar { metadata },
            Agency::Other(agency)   => Registration::Unrecognised { agency, metadata },
        }
    }

    pub fn agency(&self) -> Option<Agency> {
        match self {
            Registration::Unresolved             => None,
            Registration::Crossref { .. }        => Some(Agency::Crossref),
            Registration::DataCite { .. }        => Some(Agency::DataCite),
            Registration::SemanticScholar { .. } => Some(Agency::SemanticScholar),
            Registration::Unrecognised { agency, .. } => Some(Agency::Other(agency.clone())),
        }
    }

    pub fn metadata(&self) -> Option<&Value> {
        match self {
            Registration::Unresolved => None,
            Registration::Crossref { metadata }
            | Registration::DataCite { metadata }
            | Registration::SemanticScholar { metadata }
            | Registration::Unrecognised { metadata, .. } => metadata.as_ref(),
        }
    }

    pub fn metadata_mut(&mut self) -> Option<&mut Value> {
        match self {
            Registration::Unresolved => None,
            Registration::Crossref { metadata }
            | Registration::DataCite { metadata }
            | Registration::SemanticScholar { metadata }
            | Registration::Unrecognised { metadata, .. } => metadata.as_mut(),
        }
    }

    fn into_parts(self) -> (Option<Agency>, Option<Value>) {
        let agency = self.agency();
        let metadata = match self {
            Registration::Unresolved => None,
            Registration::Crossref { metadata }
            | Registration::DataCite { metadata }
            | Registration::SemanticScholar { metadata }
            | Registration::Unrecognised { metadata, .. } => metadata,
        };
        (agency, metadata)
    }
}

/// Everything known about one citing DOI (or Semantic Scholar paper id).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "StoredDoiRecord", into = "StoredDoiRecord")]
pub struct DoiRecord {
    pub registration: Registration,
    pub authors_related_to_portuguese: Relation,
    /// Raw OpenCitations metadata, kept for records no registry describes.
    pub opencitations: Option<Value>,
    pub extra: Map<String, Value>,
}

impl DoiRecord {
    pub fn with_agency(agency: Agency) -> Self {
        Self { registration: Registration::new(agency, None), ..Default::default() }
    }

    pub fn agency(&self) -> Option<Agency> {
        self.registration.agency()
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self.registration, Registration::Unresolved)
    }

    /// Set the agency if none is set yet. Returns whether it was set.
    pub fn resolve(&mut self, agency: Agency) -> bool {
        if self.is_resolved() {
            return false;
        }
        self.registration = Registration::new(agency, None);
        true
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.registration.metadata()
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata().is_some()
    }

    /// Attach registry metadata. No-op on an unresolved record.
    pub fn attach_metadata(&mut self, value: Value) {
        match &mut self.registration {
            Registration::Unresolved => {}
            Registration::Crossref { metadata }
            | Registration::DataCite { metadata }
            | Registration::SemanticScholar { metadata }
            | Registration::Unrecognised { metadata, .. } => *metadata = Some(value),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredDoiRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agency: Option<Agency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Relation::is_unknown")]
    authors_related_to_portuguese: Relation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    opencitations: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<StoredDoiRecord> for DoiRecord {
    fn from(stored: StoredDoiRecord) -> Self {
        let mut extra = stored.extra;
        let registration = match stored.agency {
            Some(agency) => Registration::new(agency, stored.metadata),
            None => {
                // Metadata without an agency is hand-edited data; keep it verbatim.
                if let Some(metadata) = stored.metadata {
                    extra.insert("metadata".to_string(), metadata);
                }
                Registration::Unresolved
            }
        };
        Self {
            registration,
            authors_related_to_portuguese: stored.authors_related_to_portuguese,
            opencitations: stored.opencitations,
            extra,
        }
    }
}

impl From<DoiRecord> for StoredDoiRecord {
    fn from(record: DoiRecord) -> Self {
        let (agency, metadata) = record.registration.into_parts();
        let mut extra = record.extra;
        let metadata = metadata.or_else(|| extra.remove("metadata"));
        Self {
            agency,
            metadata,
            authors_related_to_portuguese: record.authors_related_to_portuguese,
            opencitations: record.opencitations,
            extra,
        }
    }
}

// ── ORCID ───────────────────────────────────────────────────────────────────

/// Sub-resources of an ORCID record fetched by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrcidSection {
    Person,
    Employments,
}

impl OrcidSection {
    pub const ALL: [OrcidSection; 2] = [OrcidSection::Person, OrcidSection::Employments];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrcidSection::Person      => "person",
            OrcidSection::Employments => "employments",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "person"      => Some(OrcidSection::Person),
            "employments" => Some(OrcidSection::Employments),
            _ => None,
        }
    }
}

/// Cached ORCID sub-resources. An absent section means "not fetched yet".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrcidRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employments: Option<Value>,
    #[serde(default, skip_serializing_if = "Relation::is_unknown")]
    pub related_to_portuguese: Relation,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrcidRecord {
    pub fn section(&self, section: OrcidSection) -> Option<&Value> {
        match section {
            OrcidSection::Person      => self.person.as_ref(),
            OrcidSection::Employments => self.employments.as_ref(),
        }
    }

    pub fn set_section(&mut self, section: OrcidSection, value: Value) {
        match section {
            OrcidSection::Person      => self.person = Some(value),
            OrcidSection::Employments => self.employments = Some(value),
        }
    }
}
