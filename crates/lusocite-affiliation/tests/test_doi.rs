//! DOI author aggregation against fake registries.

use lusocite_common::resolver::CannedResolver;
use lusocite_common::{LusociteError, Relation};
use lusocite_affiliation::{classify_doi, classify_records};
use lusocite_ingestion::models::{Agency, DoiRecord};
use lusocite_test_utils::fixtures::{
    crossref_author, crossref_work, datacite_creator, datacite_doi, orcid_employments, orcid_person,
};
use lusocite_test_utils::pretty_assertions::assert_eq;
use lusocite_test_utils::{disk_context, memory_context, FakeRegistry, SharedResolver};
use lusocite_ingestion::models::OrcidSection;
use serde_json::json;

fn crossref_record(doi: &str, authors: Vec<serde_json::Value>) -> DoiRecord {
    let mut record = DoiRecord::with_agency(Agency::Crossref);
    record.attach_metadata(crossref_work(doi, authors));
    record
}

#[tokio::test]
async fn test_one_related_author_makes_the_doi_related() {
    let doi = "10.1000/related";
    let (_, registries) = FakeRegistry::new().into_registries();
    let resolver = SharedResolver::new(CannedResolver::new());
    let mut ctx = memory_context(registries, resolver.clone());
    ctx.caches.doi_metadata.insert(doi, crossref_record(doi, vec![
        crossref_author("Silva", &["Universidade Federal de Pernambuco, Recife, Brasil"], None),
        crossref_author("Doe", &["Neverland Lab"], None),
        crossref_author("Roe", &[], None),
    ]));

    assert_eq!(classify_doi(&mut ctx, doi).await.unwrap(), Relation::Related);
    let record = ctx.caches.doi_metadata.get(doi).unwrap();
    assert_eq!(record.authors_related_to_portuguese, Relation::Related);

    let authors = &record.metadata().unwrap()["message"]["author"];
    assert_eq!(authors[0]["related_to_portuguese"], json!(true));
    assert!(authors[1].get("related_to_portuguese").is_none());
    assert_eq!(resolver.times_asked("neverland lab"), 1);
}

#[tokio::test]
async fn test_all_unrelated_authors_make_the_doi_unrelated() {
    let doi = "10.1000/unrelated";
    let (_, registries) = FakeRegistry::new().into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());
    ctx.caches.doi_metadata.insert(doi, crossref_record(doi, vec![
        crossref_author("Smith", &["MIT, United States"], None),
        crossref_author("Jones", &["University of Oxford, United Kingdom"], None),
    ]));

    assert_eq!(classify_doi(&mut ctx, doi).await.unwrap(), Relation::Unrelated);
    assert_eq!(
        ctx.caches.doi_metadata.get(doi).unwrap().authors_related_to_portuguese,
        Relation::Unrelated
    );
}

#[tokio::test]
async fn test_one_unknown_author_leaves_the_doi_undecided() {
    let doi = "10.1000/undecided";
    let (_, registries) = FakeRegistry::new().into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());
    ctx.caches.doi_metadata.insert(doi, crossref_record(doi, vec![
        crossref_author("Smith", &["MIT, United States"], None),
        crossref_author("Jones", &["University of Oxford, United Kingdom"], None),
        crossref_author("Doe", &["Neverland Lab"], None),
    ]));

    assert_eq!(classify_doi(&mut ctx, doi).await.unwrap(), Relation::Unknown);
    assert_eq!(
        ctx.caches.doi_metadata.get(doi).unwrap().authors_related_to_portuguese,
        Relation::Unknown
    );
}

#[tokio::test]
async fn test_orcid_evidence_overrides_unknown_affiliations() {
    let doi = "10.1000/orcid";
    let orcid = "0000-0002-1694-233X";
    let (fake, registries) = FakeRegistry::new()
        .orcid(orcid, OrcidSection::Person, orcid_person(&[], None))
        .orcid(orcid, OrcidSection::Employments, orcid_employments(&["PT"]))
        .into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());
    // The registry dropped the trailing X.
    let mut author = crossref_author("Souza", &[], None);
    author["ORCID"] = json!("http://orcid.org/0000-0002-1694-233");
    ctx.caches.doi_metadata.insert(doi, crossref_record(doi, vec![author]));

    assert_eq!(classify_doi(&mut ctx, doi).await.unwrap(), Relation::Related);
    assert_eq!(fake.calls(), vec![
        format!("orcid.person:{orcid}"),
        format!("orcid.employments:{orcid}"),
    ]);
    assert_eq!(ctx.caches.orcid.get(orcid).unwrap().related_to_portuguese, Relation::Related);
}

#[tokio::test]
async fn test_datacite_record_is_fetched_and_classified() {
    let doi = "10.5281/zenodo.7";
    let (fake, registries) = FakeRegistry::new()
        .datacite(doi, datacite_doi(doi, vec![
            datacite_creator("Costa, M.", &["Universidade do Porto, Portugal"], None),
        ]))
        .into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());
    ctx.caches.doi_metadata.insert(doi, DoiRecord::with_agency(Agency::DataCite));

    assert_eq!(classify_doi(&mut ctx, doi).await.unwrap(), Relation::Related);
    assert_eq!(fake.calls_to("datacite."), 1);
    let creators = &ctx.caches.doi_metadata.get(doi).unwrap().metadata().unwrap()["data"]["attributes"]["creators"];
    assert_eq!(creators[0]["related_to_portuguese"], json!(true));
}

#[tokio::test]
async fn test_publisher_prefix_is_always_related() {
    let doi = "10.5753/sbsi.2020.1";
    let (_, registries) = FakeRegistry::new().into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());
    ctx.caches.doi_metadata.insert(doi, crossref_record(doi, vec![
        crossref_author("Smith", &["MIT, United States"], None),
    ]));

    assert_eq!(classify_doi(&mut ctx, doi).await.unwrap(), Relation::Related);
}

#[tokio::test]
async fn test_semantic_scholar_records_stay_undecided() {
    let key = "abc123";
    let (_, registries) = FakeRegistry::new().into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());
    let mut record = DoiRecord::with_agency(Agency::SemanticScholar);
    record.attach_metadata(json!({ "paperId": key, "authors": [] }));
    ctx.caches.doi_metadata.insert(key, record);

    assert_eq!(classify_doi(&mut ctx, key).await.unwrap(), Relation::Unknown);
}

#[tokio::test]
async fn test_unrecognised_agency_fails_fast() {
    let doi = "10.1400/medra";
    let (fake, registries) = FakeRegistry::new().into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());
    ctx.caches.doi_metadata.insert(doi, DoiRecord::with_agency(Agency::Other("medra".into())));

    let err = classify_doi(&mut ctx, doi).await.unwrap_err();
    assert!(matches!(err, LusociteError::UnknownAgency { ref agency, .. } if agency == "medra"));

    let err = classify_records(&mut ctx, &[]).await.unwrap_err();
    assert!(matches!(err, LusociteError::UnknownAgency { .. }));
    assert_eq!(fake.call_count(), 0);
    assert!(ctx.caches.doi_metadata.get(doi).unwrap().authors_related_to_portuguese.is_unknown());
}

#[tokio::test]
async fn test_batch_skips_decided_records_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let decided = "10.1000/decided";
    let pending = "10.1000/pending";
    let (_, registries) = FakeRegistry::new().into_registries();
    let resolver = SharedResolver::new(CannedResolver::new().answer("instituto desconhecido", true));
    let mut ctx = disk_context(dir.path(), registries, resolver.clone());

    let mut record = crossref_record(decided, vec![crossref_author("X", &["Instituto Desconhecido"], None)]);
    record.authors_related_to_portuguese = Relation::Unrelated;
    ctx.caches.doi_metadata.insert(decided, record);
    ctx.caches.doi_metadata.insert(pending, crossref_record(pending, vec![
        crossref_author("Y", &["Instituto Desconhecido"], None),
    ]));

    let report = classify_records(&mut ctx, &[]).await.unwrap();
    assert_eq!(report.classified, 1);
    assert_eq!(report.related, 1);
    assert_eq!(resolver.times_asked("instituto desconhecido"), 1);

    let saved: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("affiliations.json")).unwrap()).unwrap();
    assert_eq!(saved, json!({ "instituto desconhecido": true }));
    let saved: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("doi_metadata.json")).unwrap()).unwrap();
    assert_eq!(saved[pending]["authors_related_to_portuguese"], json!(true));
    assert_eq!(saved[decided]["authors_related_to_portuguese"], json!(false));
}
