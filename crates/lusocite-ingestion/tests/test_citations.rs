//! Citation discovery, enrichment and OpenCitations backfill.

use std::collections::BTreeSet;

use lusocite_ingestion::citations::{backfill_opencitations, discover_citations};
use lusocite_ingestion::models::{Agency, DoiRecord, Publication};
use lusocite_test_utils::fixtures::{
    crossref_agency, crossref_work, dblp_hit, oc_citations, oc_metadata, s2_paper,
};
use lusocite_test_utils::pretty_assertions::assert_eq;
use lusocite_test_utils::{disk_context, memory_context, FakeRegistry, SharedResolver};

const CITED: &str = "10.5753/sbsi.2019.1";

fn publication(doi: Option<&str>) -> Publication {
    serde_json::from_value(dblp_hit("1", "Um estudo", "2019", doi, &["p/1"])).unwrap()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn registry() -> FakeRegistry {
    FakeRegistry::new()
        .oc_citations(CITED, oc_citations(CITED, &["10.1145/A", "10.1016/b"]))
        .s2_paper(
            CITED,
            s2_paper("self", &[(Some("10.1145/a"), "x"), (None, "PAPER1"), (Some("10.5555/abc123"), "y")]),
        )
        .crossref_agency("10.1145/a", crossref_agency("10.1145/a", "crossref"))
        .crossref_work("10.1145/a", crossref_work("10.1145/a", vec![]))
        .s2_paper("paper1", s2_paper("paper1", &[]))
}

#[tokio::test]
async fn test_discovery_merges_both_indexes() {
    let (fake, registries) = registry().into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());

    let report = discover_citations(&mut ctx, &[publication(Some(CITED)), publication(None)], false)
        .await
        .unwrap();

    assert_eq!(report.publications, 1);
    assert_eq!(report.queried, 1);
    assert_eq!(report.new_citing, 3);
    assert_eq!(
        ctx.caches.citations.get(CITED).cloned().unwrap(),
        set(&["10.1016/b", "10.1145/a", "paper1"])
    );
    // 10.5555 ids never reach the citation set or the agency lookup.
    assert!(!ctx.caches.doi_metadata.contains_key("10.5555/abc123"));
    assert_eq!(
        ctx.caches.doi_metadata.get("paper1").unwrap().agency(),
        Some(Agency::SemanticScholar)
    );
    assert!(ctx.caches.doi_metadata.get("10.1145/a").unwrap().has_metadata());
    assert!(ctx.caches.doi_metadata.get("paper1").unwrap().has_metadata());
    assert_eq!(report.enriched, 2);
    assert!(fake.calls_to("crossref.agency:10.1016/b") == 1);
}

#[tokio::test]
async fn test_cached_citations_are_not_requeried() {
    let (fake, registries) = registry().into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());
    ctx.caches.citations.insert(CITED, set(&["10.1145/a"]));
    ctx.caches.doi_metadata.insert("10.1145/a", {
        let mut record = DoiRecord::with_agency(Agency::Crossref);
        record.attach_metadata(serde_json::json!({ "status": "ok" }));
        record
    });

    let report = discover_citations(&mut ctx, &[publication(Some(CITED))], false).await.unwrap();

    assert_eq!(report.queried, 0);
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn test_refresh_merges_without_removing() {
    let (fake, registries) = registry().into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());
    ctx.caches.citations.insert(CITED, set(&["10.9999/old"]));

    discover_citations(&mut ctx, &[publication(Some(CITED))], true).await.unwrap();

    let citing = ctx.caches.citations.get(CITED).cloned().unwrap();
    assert!(citing.contains("10.9999/old"));
    assert!(citing.contains("10.1145/a"));
    assert_eq!(fake.calls_to("opencitations.citations"), 1);
}

fn outage() -> FakeRegistry {
    FakeRegistry::new()
        .status(&format!("opencitations.citations:{CITED}"), 500)
        .status(&format!("semanticscholar.paper:{CITED}"), 429)
}

#[tokio::test]
async fn test_index_outage_leaves_no_entry() {
    let (fake, registries) = outage().into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());

    let report = discover_citations(&mut ctx, &[publication(Some(CITED))], false).await.unwrap();
    assert_eq!(report.new_citing, 0);
    assert!(!ctx.caches.citations.contains_key(CITED));

    let report = discover_citations(&mut ctx, &[publication(Some(CITED))], false).await.unwrap();
    assert_eq!(report.queried, 1);
    assert_eq!(fake.calls_to("opencitations.citations"), 2);
    assert!(!ctx.caches.citations.contains_key(CITED));
}

#[tokio::test]
async fn test_outage_is_retried_on_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let (_fake, registries) = outage().into_registries();
    let mut ctx = disk_context(dir.path(), registries, SharedResolver::default());
    discover_citations(&mut ctx, &[publication(Some(CITED))], false).await.unwrap();
    drop(ctx);

    let (fake, registries) = registry().into_registries();
    let mut ctx = disk_context(dir.path(), registries, SharedResolver::default());
    let report = discover_citations(&mut ctx, &[publication(Some(CITED))], false).await.unwrap();

    assert_eq!(report.queried, 1);
    assert_eq!(fake.calls_to("opencitations.citations"), 1);
    assert_eq!(
        ctx.caches.citations.get(CITED).cloned().unwrap(),
        set(&["10.1016/b", "10.1145/a", "paper1"])
    );
}

#[tokio::test]
async fn test_one_index_answering_records_the_entry() {
    let fake = FakeRegistry::new()
        .oc_citations(CITED, oc_citations(CITED, &["10.1145/A"]))
        .status(&format!("semanticscholar.paper:{CITED}"), 429);
    let (_fake, registries) = fake.into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());

    discover_citations(&mut ctx, &[publication(Some(CITED))], false).await.unwrap();

    assert_eq!(ctx.caches.citations.get(CITED).cloned().unwrap(), set(&["10.1145/a"]));
}

#[tokio::test]
async fn test_discovery_persists_maps() {
    let dir = tempfile::tempdir().unwrap();
    let (_fake, registries) = registry().into_registries();
    let mut ctx = disk_context(dir.path(), registries, SharedResolver::default());

    discover_citations(&mut ctx, &[publication(Some(CITED))], false).await.unwrap();

    let citations: serde_json::Value =
        lusocite_common::store::load_json(&dir.path().join("citations.json")).unwrap();
    assert_eq!(citations[CITED].as_array().unwrap().len(), 3);
    let metadata: serde_json::Value =
        lusocite_common::store::load_json(&dir.path().join("doi_metadata.json")).unwrap();
    assert_eq!(metadata["paper1"]["agency"], "semanticscholar");
    assert_eq!(metadata["10.1145/a"]["agency"], "crossref");
}

#[tokio::test]
async fn test_backfill_only_touches_undescribed_records() {
    let (fake, registries) = FakeRegistry::new()
        .oc_metadata(
            &["10.1000/x", "10.1000/y"],
            serde_json::json!([oc_metadata("10.1000/X", "Described by OC")]),
        )
        .into_registries();
    let mut ctx = memory_context(registries, SharedResolver::default());
    ctx.caches.doi_metadata.insert("10.1000/x", DoiRecord::default());
    ctx.caches.doi_metadata.insert("10.1000/y", DoiRecord::default());
    ctx.caches.doi_metadata.insert("10.1000/z", {
        let mut record = DoiRecord::with_agency(Agency::Crossref);
        record.attach_metadata(serde_json::json!({ "status": "ok" }));
        record
    });

    let keys: Vec<String> = ["10.1000/x", "10.1000/y", "10.1000/z", "paperid"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let updated = backfill_opencitations(&mut ctx, &keys).await.unwrap();

    assert_eq!(updated, 1);
    assert_eq!(fake.calls(), vec!["opencitations.metadata:10.1000/x__10.1000/y"]);
    let record = ctx.caches.doi_metadata.get("10.1000/x").unwrap();
    assert_eq!(record.opencitations.as_ref().unwrap()["title"], "Described by OC");
}
