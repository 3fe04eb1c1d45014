//! Live registry smoke tests. These hit the public APIs.
//!
//! Run with: cargo test --package lusocite-ingestion --test test_live_registries -- --ignored --nocapture

use lusocite_common::sandbox::SandboxClient;
use lusocite_ingestion::sources::{
    crossref, dblp, opencitations, semanticscholar, CrossrefApi, DblpApi, OpenCitationsApi,
    OrcidCredentials, Registries, SemanticScholarApi,
};
use lusocite_ingestion::models::Agency;

fn registries() -> Registries {
    let client = SandboxClient::new("lusocite-tests/0.1 (mailto:lusocite@example.org)", None).unwrap();
    Registries::http(client, OrcidCredentials::default())
}

#[tokio::test]
#[ignore]
async fn test_dblp_conference_count() {
    let body = registries().dblp.search_page("sbsi", 0, 0).await.unwrap();
    let total = dblp::parse_total(&body).unwrap();
    println!("sbsi publications: {total}");
    assert!(total > 0);
}

#[tokio::test]
#[ignore]
async fn test_crossref_agency_of_acm_doi() {
    let body = registries().crossref.agency("10.1145/3330204.3330230").await.unwrap();
    assert_eq!(crossref::parse_agency(&body).unwrap(), Agency::Crossref);
}

#[tokio::test]
#[ignore]
async fn test_citation_indexes_answer() {
    let registries = registries();
    let doi = "10.1145/3330204.3330230";
    let oc = registries.opencitations.citations(doi).await.unwrap();
    println!("OpenCitations citing: {:?}", opencitations::parse_citing(&oc).unwrap());
    match registries.semantic_scholar.paper(doi).await {
        Ok(body) => println!("Semantic Scholar citing: {:?}", semanticscholar::parse_citations(&body)),
        Err(e) => println!("Semantic Scholar unavailable: {e}"),
    }
}
