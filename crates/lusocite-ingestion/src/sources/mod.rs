//! Registry clients.
//!
//! One trait per external registry. Every method performs exactly one
//! request and hands back the raw wire value; interpretation lives in the
//! `parse_*` functions next to each client so it can be tested offline and
//! shared with the in-memory fakes used by integration tests.

pub mod crossref;
pub mod datacite;
pub mod dblp;
pub mod opencitations;
pub mod orcid;
pub mod semanticscholar;

use std::sync::Arc;

use lusocite_common::sandbox::SandboxClient;

pub use crossref::{CrossRefClient, CrossrefApi};
pub use datacite::{DataCiteApi, DataCiteClient};
pub use dblp::{DblpApi, DblpClient};
pub use opencitations::{OpenCitationsApi, OpenCitationsClient};
pub use orcid::{OrcidApi, OrcidClient, OrcidCredentials};
pub use semanticscholar::{SemanticScholarApi, SemanticScholarClient};

/// One handle per registry, shared by every pipeline operation.
#[derive(Clone)]
pub struct Registries {
    pub dblp:             Arc<dyn DblpApi>,
    pub opencitations:    Arc<dyn OpenCitationsApi>,
    pub semantic_scholar: Arc<dyn SemanticScholarApi>,
    pub crossref:         Arc<dyn CrossrefApi>,
    pub datacite:         Arc<dyn DataCiteApi>,
    pub orcid:            Arc<dyn OrcidApi>,
}

impl Registries {
    /// Live HTTP clients sharing one allow-listed connection pool.
    pub fn http(client: SandboxClient, orcid: OrcidCredentials) -> Self {
        Self {
            dblp:             Arc::new(DblpClient::new(client.clone())),
            opencitations:    Arc::new(OpenCitationsClient::new(client.clone())),
            semantic_scholar: Arc::new(SemanticScholarClient::new(client.clone())),
            crossref:         Arc::new(CrossRefClient::new(client.clone())),
            datacite:         Arc::new(DataCiteClient::new(client.clone())),
            orcid:            Arc::new(OrcidClient::new(client, orcid)),
        }
    }

    /// Route every registry to the same implementation (test fakes).
    pub fn uniform<R>(registry: Arc<R>) -> Self
    where
        R: DblpApi
            + OpenCitationsApi
            + SemanticScholarApi
            + CrossrefApi
            + DataCiteApi
            + OrcidApi
            + 'static,
    {
        Self {
            dblp:             registry.clone(),
            opencitations:    registry.clone(),
            semantic_scholar: registry.clone(),
            crossref:         registry.clone(),
            datacite:         registry.clone(),
            orcid:            registry,
        }
    }
}

impl std::fmt::Debug for Registries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registries").finish_non_exhaustive()
    }
}
