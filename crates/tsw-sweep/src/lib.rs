//! tsw-sweep
//!
//! Sequential sweep over namespaces → repositories → tags → tag-detail
//! records. Each record goes through the decision engine exactly once; the
//! runner logs one line per record and, in live mode, issues the scan
//! trigger for the actions that ask for one. All network failures below the
//! namespace list are logged and skipped — one tag must never sink the
//! sweep.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use tsw_decision::{decide, Action, DecisionInput, TagScanState};
use tsw_registry::RegistryClient;

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Run-scoped counters, returned by value at the end of the sweep.
/// Repositories with no tags are counted here even though they produce no
/// per-record output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub repositories: u64,
    pub tag_records: u64,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// One sweep's fixed inputs: the client, the clamped threshold, the mode,
/// and the single "now" every record is measured against.
pub struct SweepRunner {
    client: Arc<dyn RegistryClient>,
    threshold_days: i64,
    dry_run: bool,
    now: DateTime<Utc>,
}

impl SweepRunner {
    pub fn new(
        client: Arc<dyn RegistryClient>,
        threshold_days: i64,
        dry_run: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            client,
            threshold_days,
            dry_run,
            now,
        }
    }

    /// Walk every namespace in list order and evaluate each tag-detail
    /// record it resolves to. Strictly sequential: a record is fully
    /// handled, trigger call included, before the next is fetched.
    pub async fn run(&self, namespaces: &[String]) -> SweepSummary {
        let mut summary = SweepSummary::default();

        for namespace in namespaces {
            let repositories = match self.client.list_repositories(namespace).await {
                Ok(repositories) => repositories,
                Err(err) => {
                    warn!(%namespace, error = %err, "repository listing failed, skipping namespace");
                    continue;
                }
            };

            for repository in &repositories {
                summary.repositories += 1;

                let tags = match self.client.list_tags(namespace, repository).await {
                    Ok(tags) => tags,
                    Err(err) => {
                        warn!(%namespace, %repository, error = %err, "tag listing failed, skipping repository");
                        continue;
                    }
                };

                // An empty tag list is silently skipped: no log line, no
                // record count.
                for tag in &tags {
                    let records = match self.client.tag_details(namespace, repository, tag).await
                    {
                        Ok(records) => records,
                        Err(err) => {
                            warn!(%namespace, %repository, %tag, error = %err, "tag detail fetch failed, skipping tag");
                            continue;
                        }
                    };

                    for state in &records {
                        summary.tag_records += 1;
                        self.apply(state).await;
                    }
                }
            }
        }

        summary
    }

    /// Decide one record and carry out the action.
    async fn apply(&self, state: &TagScanState) {
        let action = decide(&DecisionInput {
            state,
            threshold_days: self.threshold_days,
            now: self.now,
        });

        match action {
            Action::SkipPending => {
                info!(
                    namespace = %state.namespace,
                    repository = %state.repository,
                    tag = %state.tag,
                    status = state.last_scan_status.code(),
                    should_rescan = state.should_rescan,
                    completed_at = ?state.check_completed_at,
                    "scan is pending"
                );
            }
            Action::SkipUpToDate => {
                info!(
                    namespace = %state.namespace,
                    repository = %state.repository,
                    tag = %state.tag,
                    status = state.last_scan_status.code(),
                    should_rescan = state.should_rescan,
                    completed_at = ?state.check_completed_at,
                    "scan is up to date"
                );
            }
            Action::Unknown => {
                info!(
                    namespace = %state.namespace,
                    repository = %state.repository,
                    tag = %state.tag,
                    status = state.last_scan_status.code(),
                    should_rescan = state.should_rescan,
                    "scan status is unknown"
                );
            }
            Action::ForceStale { days_since } | Action::RescanRequested { days_since } => {
                self.trigger(state, action.reason(), days_since).await;
            }
        }
    }

    async fn trigger(&self, state: &TagScanState, reason: &'static str, days_since: i64) {
        if self.dry_run {
            // The dry-run line must stay distinguishable from the live one;
            // operators audit intended behavior with it.
            info!(
                namespace = %state.namespace,
                repository = %state.repository,
                tag = %state.tag,
                status = state.last_scan_status.code(),
                should_rescan = state.should_rescan,
                completed_at = ?state.check_completed_at,
                days_since,
                reason,
                "would send scan request (dry run)"
            );
            return;
        }

        info!(
            namespace = %state.namespace,
            repository = %state.repository,
            tag = %state.tag,
            status = state.last_scan_status.code(),
            should_rescan = state.should_rescan,
            completed_at = ?state.check_completed_at,
            days_since,
            reason,
            "sending scan request"
        );

        if let Err(err) = self.client.trigger_scan(state).await {
            warn!(
                namespace = %state.namespace,
                repository = %state.repository,
                tag = %state.tag,
                error = %err,
                "unable to trigger scan"
            );
        }
    }
}
