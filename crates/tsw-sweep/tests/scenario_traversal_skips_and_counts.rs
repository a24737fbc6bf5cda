//! Traversal policy: per-item network failures are logged and skipped, tag-
//! less repositories are silent, and the summary counters come back by
//! value.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tsw_decision::{ScanStatus, TagScanState, VulnCounts};
use tsw_registry::{RegistryClient, RegistryError};
use tsw_sweep::{SweepRunner, SweepSummary};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn fresh_record(namespace: &str, repository: &str, tag: &str) -> TagScanState {
    TagScanState {
        namespace: namespace.into(),
        repository: repository.into(),
        tag: tag.into(),
        os: "linux".into(),
        architecture: "amd64".into(),
        last_scan_status: ScanStatus::Ok,
        should_rescan: false,
        check_completed_at: Some(now() - Duration::days(1)),
        vulnerabilities: VulnCounts::default(),
    }
}

/// Keyed fake: anything absent from a map answers with an API error, which
/// is how the runner's skip paths get exercised.
#[derive(Default)]
struct FakeRegistry {
    repositories: BTreeMap<String, Vec<String>>,
    tags: BTreeMap<(String, String), Vec<String>>,
    details: BTreeMap<(String, String, String), Vec<TagScanState>>,
    triggered: Mutex<Vec<String>>,
}

fn not_found() -> RegistryError {
    RegistryError::Api {
        status: 404,
        message: "not found".to_string(),
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn list_repositories(&self, namespace: &str) -> Result<Vec<String>, RegistryError> {
        self.repositories
            .get(namespace)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn list_tags(
        &self,
        namespace: &str,
        repository: &str,
    ) -> Result<Vec<String>, RegistryError> {
        self.tags
            .get(&(namespace.to_string(), repository.to_string()))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn tag_details(
        &self,
        namespace: &str,
        repository: &str,
        tag: &str,
    ) -> Result<Vec<TagScanState>, RegistryError> {
        self.details
            .get(&(
                namespace.to_string(),
                repository.to_string(),
                tag.to_string(),
            ))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn trigger_scan(&self, state: &TagScanState) -> Result<(), RegistryError> {
        self.triggered
            .lock()
            .unwrap()
            .push(format!("{}/{}", state.namespace, state.tag));
        Ok(())
    }
}

#[tokio::test]
async fn failures_skip_the_failed_item_and_continue() {
    let mut fake = FakeRegistry::default();

    // "ghost" namespace: repository listing fails, whole namespace skipped.
    // "team" namespace: three repositories with different outcomes.
    fake.repositories.insert(
        "team".to_string(),
        vec![
            "empty".to_string(),
            "broken-tags".to_string(),
            "web".to_string(),
        ],
    );

    // "empty" has no tags: visited, silent.
    fake.tags
        .insert(("team".to_string(), "empty".to_string()), vec![]);
    // "broken-tags" has no entry: tag listing fails, repository skipped but
    // still counted as visited.
    // "web" has one good tag and one whose detail fetch fails.
    fake.tags.insert(
        ("team".to_string(), "web".to_string()),
        vec!["good".to_string(), "broken-detail".to_string()],
    );
    fake.details.insert(
        ("team".to_string(), "web".to_string(), "good".to_string()),
        vec![fresh_record("team", "web", "good")],
    );

    let fake = Arc::new(fake);
    let runner = SweepRunner::new(fake.clone(), 30, true, now());
    let summary = runner
        .run(&["ghost".to_string(), "team".to_string()])
        .await;

    assert_eq!(
        summary,
        SweepSummary {
            repositories: 3,
            tag_records: 1
        }
    );
    assert!(fake.triggered.lock().unwrap().is_empty());
}

#[tokio::test]
async fn namespaces_are_walked_in_list_order() {
    let mut fake = FakeRegistry::default();
    for ns in ["first", "second"] {
        fake.repositories
            .insert(ns.to_string(), vec!["repo".to_string()]);
        fake.tags
            .insert((ns.to_string(), "repo".to_string()), vec!["v1".to_string()]);
        fake.details.insert(
            (ns.to_string(), "repo".to_string(), "v1".to_string()),
            vec![TagScanState {
                should_rescan: true,
                ..fresh_record(ns, "repo", "v1")
            }],
        );
    }

    let fake = Arc::new(fake);
    let runner = SweepRunner::new(fake.clone(), 30, false, now());
    let summary = runner
        .run(&["second".to_string(), "first".to_string()])
        .await;

    assert_eq!(summary.repositories, 2);
    assert_eq!(summary.tag_records, 2);
    // Trigger order follows namespace list order, not map order.
    let triggered = fake.triggered.lock().unwrap();
    assert_eq!(*triggered, vec!["second/v1", "first/v1"]);
}
