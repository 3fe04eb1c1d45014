//! Conference snapshot loader against a fake DBLP.

use lusocite_common::store::save_json;
use lusocite_ingestion::conference::{self, snapshot_path};
use lusocite_ingestion::models::Publication;
use lusocite_test_utils::fixtures::{dblp_hit, dblp_page};
use lusocite_test_utils::pretty_assertions::assert_eq;
use lusocite_test_utils::{FakeRegistry, TableLanguage};
use serde_json::Value;

fn hits(range: std::ops::Range<usize>) -> Vec<Value> {
    range
        .map(|i| {
            let doi = format!("10.5753/sbsi.{i}");
            dblp_hit(&i.to_string(), &format!("Title {i}"), "2019", Some(doi.as_str()), &["p/1"])
        })
        .collect()
}

fn two_page_conference() -> FakeRegistry {
    FakeRegistry::new()
        .search_page("sbsi", 0, 0, dblp_page(101, vec![]))
        .search_page("sbsi", 100, 0, dblp_page(101, hits(0..100)))
        .search_page("sbsi", 100, 100, dblp_page(101, hits(100..101)))
}

#[tokio::test]
async fn test_download_reads_count_then_every_page() {
    let (fake, registries) = two_page_conference().into_registries();
    let model = TableLanguage::new().label("Title 7", "__label__pt");

    let publications = conference::download(registries.dblp.as_ref(), &model, "sbsi")
        .await
        .expect("download succeeds");

    assert_eq!(publications.len(), 101);
    assert_eq!(
        fake.calls(),
        vec!["dblp.search:sbsi:0:0", "dblp.search:sbsi:100:0", "dblp.search:sbsi:100:100"]
    );
    assert_eq!(publications[7].language.as_deref(), Some("__label__pt"));
    assert_eq!(publications[8].language.as_deref(), Some("__label__en"));
    assert_eq!(model.calls(), 101);
}

#[tokio::test]
async fn test_failed_page_voids_whole_download() {
    let fake = FakeRegistry::new()
        .search_page("sbsi", 0, 0, dblp_page(101, vec![]))
        .search_page("sbsi", 100, 0, dblp_page(101, hits(0..100)))
        .status("dblp.search:sbsi:100:100", 500);
    let (_fake, registries) = fake.into_registries();
    let dir = tempfile::tempdir().unwrap();

    let loaded = conference::load(dir.path(), registries.dblp.as_ref(), &TableLanguage::new(), "sbsi", false)
        .await
        .unwrap();

    assert!(loaded.is_none());
    assert!(!snapshot_path(dir.path(), "sbsi").exists());
}

#[tokio::test]
async fn test_empty_conference_downloads_nothing_else() {
    let fake = FakeRegistry::new().search_page("none", 0, 0, dblp_page(0, vec![]));
    let (fake, registries) = fake.into_registries();

    let publications = conference::download(registries.dblp.as_ref(), &TableLanguage::new(), "none")
        .await
        .unwrap();

    assert!(publications.is_empty());
    assert_eq!(fake.call_count(), 1);
}

#[tokio::test]
async fn test_cached_snapshot_makes_no_requests() {
    let dir = tempfile::tempdir().unwrap();
    let path = snapshot_path(dir.path(), "sbsi");
    let cached: Vec<Publication> =
        serde_json::from_value(Value::Array(hits(0..3))).unwrap();
    save_json(&cached, &path).unwrap();
    let before = std::fs::read(&path).unwrap();

    let (fake, registries) = FakeRegistry::new().into_registries();
    let loaded = conference::load(dir.path(), registries.dblp.as_ref(), &TableLanguage::new(), "sbsi", false)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(fake.call_count(), 0);
    assert_eq!(loaded, cached);
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn test_force_redownloads_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = snapshot_path(dir.path(), "sbsi");
    let stale: Vec<Publication> = serde_json::from_value(Value::Array(hits(0..3))).unwrap();
    save_json(&stale, &path).unwrap();

    let (fake, registries) = two_page_conference().into_registries();
    let loaded = conference::load(dir.path(), registries.dblp.as_ref(), &TableLanguage::new(), "sbsi", true)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(fake.call_count(), 3);
    assert_eq!(loaded.len(), 101);
    let on_disk: Vec<Publication> = lusocite_common::store::load_json(&path).unwrap();
    assert_eq!(on_disk, loaded);
}
