//! lusocite-ingestion: Bibliographic registry ingestion.
//! Covers:
//! - Conference snapshots from DBLP (language-tagged)
//! - Citation discovery (OpenCitations, Semantic Scholar)
//! - Agency resolution and metadata retrieval (Crossref, DataCite, Semantic Scholar)
//! - ORCID person / employment records
//! - DBLP author affiliation directory

pub mod agency;
pub mod authors;
pub mod citations;
pub mod conference;
pub mod context;
pub mod language;
pub mod models;
pub mod sources;

pub use context::{Caches, Context};
pub use models::{Agency, DoiRecord, OrcidRecord, Publication, Registration};
pub use sources::Registries;
