//! Persistence tests for the durable metrics file: survive restarts,
//! tolerate corruption, never leave partial writes behind.

use tempfile::TempDir;

use partnerlink::classify::AmazonDomain;
use partnerlink::{Metrics, MetricsStore, Outcome};

#[test]
fn test_counters_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metrics.json");

    {
        let store = MetricsStore::load(&path);
        store.record(Outcome::TotalQuery);
        store.record(Outcome::Success(AmazonDomain::It));
        store.record(Outcome::TotalQuery);
        store.record(Outcome::FailedExtraction);
    }

    let store = MetricsStore::load(&path);
    let snap = store.snapshot();
    assert_eq!(snap.total_queries, 2);
    assert_eq!(snap.successful_conversions, 1);
    assert_eq!(snap.failed_extractions, 1);
    assert_eq!(snap.domains["amazon.it"], 1);
}

#[test]
fn test_start_time_survives_restart_and_reset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metrics.json");

    let first_start = {
        let store = MetricsStore::load(&path);
        store.record(Outcome::TotalQuery);
        store.snapshot().start_time
    };

    let store = MetricsStore::load(&path);
    assert_eq!(store.snapshot().start_time, first_start);

    store.reset();
    let snap = store.snapshot();
    assert_eq!(snap.total_queries, 0);
    assert_eq!(snap.start_time, first_start);
}

#[test]
fn test_malformed_file_starts_fresh_without_panicking() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metrics.json");
    std::fs::write(&path, b"{ this is not json").unwrap();

    let store = MetricsStore::load(&path);
    assert_eq!(store.snapshot().total_queries, 0);

    // The next record replaces the corrupt file with valid state.
    store.record(Outcome::TotalQuery);
    let on_disk: Metrics = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk.total_queries, 1);
}

#[test]
fn test_partial_file_merges_over_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metrics.json");
    std::fs::write(&path, br#"{"total_queries": 42}"#).unwrap();

    let store = MetricsStore::load(&path);
    let snap = store.snapshot();
    assert_eq!(snap.total_queries, 42);
    assert_eq!(snap.successful_conversions, 0);
    assert!(snap.domains.is_empty());
    assert!(!snap.start_time.is_empty());
}

#[test]
fn test_no_temp_file_left_behind_after_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metrics.json");

    let store = MetricsStore::load(&path);
    store.record(Outcome::TotalQuery);
    store.record(Outcome::Success(AmazonDomain::De));

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn test_on_disk_state_is_valid_json_after_every_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metrics.json");
    let store = MetricsStore::load(&path);

    for _ in 0..5 {
        store.record(Outcome::TotalQuery);
        let on_disk: Metrics =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(on_disk.last_updated.is_some());
    }
    let on_disk: Metrics = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk.total_queries, 5);
}
