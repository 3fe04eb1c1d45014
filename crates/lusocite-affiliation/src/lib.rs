//! lusocite-affiliation: Deciding whether authors are related to the
//! Portuguese-speaking world.
//! Covers:
//! - Affiliation normalisation and the place-name gazetteer
//! - Memoised free-text classification with an operator fallback
//! - ORCID identity classification (addresses, employments, biography)
//! - DOI-level author aggregation

pub mod classify;
pub mod doi;
pub mod gazetteer;
pub mod normalise;
pub mod orcid;
pub mod prompt;

pub use classify::{classify_affiliation, classify_text};
pub use doi::{classify_doi, classify_records, AuthorTally, ClassifyReport, PUBLISHER_PREFIX};
pub use orcid::{canonical_orcid, classify_orcid};
pub use prompt::TerminalResolver;
