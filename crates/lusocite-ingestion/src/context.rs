//! Process context threaded through every pipeline operation.

use std::collections::BTreeSet;
use std::path::Path;

use lusocite_common::resolver::UnknownResolver;
use lusocite_common::{Cache, Result};
use tracing::info;

use crate::models::{DoiRecord, OrcidRecord};
use crate::sources::Registries;

pub const DOI_METADATA_FILE: &str = "doi_metadata.json";
pub const ORCID_FILE:        &str = "orcid.json";
pub const AFFILIATIONS_FILE: &str = "affiliations.json";
pub const CITATIONS_FILE:    &str = "citations.json";

/// The four persistent maps.
#[derive(Debug)]
pub struct Caches {
    pub doi_metadata: Cache<DoiRecord>,
    pub orcid:        Cache<OrcidRecord>,
    /// Normalised affiliation string → related to the Portuguese-speaking world.
    pub affiliations: Cache<bool>,
    pub citations:    Cache<BTreeSet<String>>,
}

impl Caches {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let caches = Self {
            doi_metadata: Cache::open(data_dir.join(DOI_METADATA_FILE))?,
            orcid:        Cache::open(data_dir.join(ORCID_FILE))?,
            affiliations: Cache::open(data_dir.join(AFFILIATIONS_FILE))?,
            citations:    Cache::open(data_dir.join(CITATIONS_FILE))?,
        };
        info!(
            data_dir = %data_dir.display(),
            dois = caches.doi_metadata.len(),
            orcids = caches.orcid.len(),
            affiliations = caches.affiliations.len(),
            citations = caches.citations.len(),
            "Opened caches"
        );
        Ok(caches)
    }

    /// Caches with no backing files.
    pub fn in_memory() -> Self {
        Self {
            doi_metadata: Cache::in_memory(),
            orcid:        Cache::in_memory(),
            affiliations: Cache::in_memory(),
            citations:    Cache::in_memory(),
        }
    }

    pub fn save_all(&mut self) -> Result<()> {
        self.doi_metadata.save()?;
        self.orcid.save()?;
        self.affiliations.save()?;
        self.citations.save()
    }
}

pub struct Context {
    pub caches: Caches,
    pub registries: Registries,
    pub resolver: Box<dyn UnknownResolver + Send>,
}

impl Context {
    pub fn new(
        caches: Caches,
        registries: Registries,
        resolver: Box<dyn UnknownResolver + Send>,
    ) -> Self {
        Self { caches, registries, resolver }
    }
}
