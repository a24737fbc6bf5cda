//! tsw-registry
//!
//! DTR REST client. This crate owns the client boundary trait
//! ([`RegistryClient`]) and the concrete reqwest-backed [`DtrClient`]. It
//! fetches and converts; it decides nothing — callers feed the snapshots to
//! tsw-decision.

pub mod client;

pub use client::{RegistryClient, RegistryError};

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tsw_decision::{ScanStatus, TagScanState, VulnCounts};

/// Repository API root under the registry base URL.
const REPOSITORIES_PATH: &str = "api/v0/repositories";
/// Scan-trigger API root under the registry base URL.
const IMAGESCAN_PATH: &str = "api/v0/imagescan/scan";
/// Explicit page size for the repository listing. Without it the server
/// returns at most 10 results.
const PAGE_SIZE: &str = "1000000";

/// Per-request deadline for the two listing calls.
const LIST_DEADLINE: Duration = Duration::from_secs(90);
/// Per-request deadline for tag-detail fetches and scan triggers; the
/// registry can take minutes to answer these.
const DETAIL_DEADLINE: Duration = Duration::from_secs(900);

// ---------------------------------------------------------------------------
// Concrete client
// ---------------------------------------------------------------------------

/// Docker Trusted Registry client over HTTPS with basic auth.
///
/// Credentials are passed in by the caller (CLI); do not log the token.
#[derive(Debug, Clone)]
pub struct DtrClient {
    base_url: String,
    user: String,
    token: String,
    http: reqwest::Client,
}

impl DtrClient {
    pub fn new(base_url: String, user: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user,
            token,
            http: reqwest::Client::new(),
        }
    }

    fn repositories_url(&self, namespace: &str) -> String {
        // Trailing slash before the query matters to the DTR router.
        format!("{}/{}/{}/", self.base_url, REPOSITORIES_PATH, namespace)
    }

    fn tags_url(&self, namespace: &str, repository: &str) -> String {
        format!(
            "{}/{}/{}/{}/tags",
            self.base_url, REPOSITORIES_PATH, namespace, repository
        )
    }

    fn tag_detail_url(&self, namespace: &str, repository: &str, tag: &str) -> String {
        format!(
            "{}/{}/{}/{}/tags/{}",
            self.base_url, REPOSITORIES_PATH, namespace, repository, tag
        )
    }

    fn scan_url(&self, state: &TagScanState) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}/{}",
            self.base_url,
            IMAGESCAN_PATH,
            state.namespace,
            state.repository,
            state.tag,
            state.os,
            state.architecture
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        deadline: Duration,
        query: &[(&str, &str)],
    ) -> Result<T, RegistryError> {
        let resp = self
            .http
            .get(&url)
            .query(query)
            .basic_auth(&self.user, Some(&self.token))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(deadline)
            .send()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RegistryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| RegistryError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RegistryClient for DtrClient {
    async fn list_repositories(&self, namespace: &str) -> Result<Vec<String>, RegistryError> {
        let page: RepositoryPage = self
            .get_json(
                self.repositories_url(namespace),
                LIST_DEADLINE,
                &[("pageSize", PAGE_SIZE)],
            )
            .await?;
        Ok(page.repositories.into_iter().map(|r| r.name).collect())
    }

    async fn list_tags(
        &self,
        namespace: &str,
        repository: &str,
    ) -> Result<Vec<String>, RegistryError> {
        let tags: Vec<TagRef> = self
            .get_json(self.tags_url(namespace, repository), LIST_DEADLINE, &[])
            .await?;
        Ok(tags.into_iter().map(|t| t.name).collect())
    }

    async fn tag_details(
        &self,
        namespace: &str,
        repository: &str,
        tag: &str,
    ) -> Result<Vec<TagScanState>, RegistryError> {
        let records: Vec<TagDetailWire> = self
            .get_json(
                self.tag_detail_url(namespace, repository, tag),
                DETAIL_DEADLINE,
                &[],
            )
            .await?;
        Ok(records
            .into_iter()
            .map(|r| r.into_state(namespace, repository))
            .collect())
    }

    async fn trigger_scan(&self, state: &TagScanState) -> Result<(), RegistryError> {
        let resp = self
            .http
            .post(self.scan_url(state))
            .basic_auth(&self.user, Some(&self.token))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(DETAIL_DEADLINE)
            .send()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RegistryError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct RepositoryPage {
    #[serde(default)]
    repositories: Vec<RepositoryName>,
}

#[derive(Debug, Clone, Deserialize)]
struct RepositoryName {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TagRef {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TagDetailWire {
    name: String,
    manifest: ManifestWire,
    vuln_summary: VulnSummaryWire,
}

#[derive(Debug, Clone, Deserialize)]
struct ManifestWire {
    #[serde(default)]
    os: String,
    #[serde(default)]
    architecture: String,
}

#[derive(Debug, Clone, Deserialize)]
struct VulnSummaryWire {
    #[serde(default)]
    critical: i64,
    #[serde(default)]
    major: i64,
    #[serde(default)]
    minor: i64,
    #[serde(default)]
    last_scan_status: i64,
    check_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    should_rescan: bool,
}

/// The registry reports 0001-01-01T00:00:00Z for tags that never completed
/// a scan.
fn is_zero_sentinel(t: &DateTime<Utc>) -> bool {
    t.year() == 1 && t.ordinal() == 1 && t.num_seconds_from_midnight() == 0
}

impl TagDetailWire {
    fn into_state(self, namespace: &str, repository: &str) -> TagScanState {
        let completed = self
            .vuln_summary
            .check_completed_at
            .filter(|t| !is_zero_sentinel(t));

        TagScanState {
            namespace: namespace.to_string(),
            repository: repository.to_string(),
            tag: self.name,
            os: self.manifest.os,
            architecture: self.manifest.architecture,
            last_scan_status: ScanStatus::from_code(self.vuln_summary.last_scan_status),
            should_rescan: self.vuln_summary.should_rescan,
            check_completed_at: completed,
            vulnerabilities: VulnCounts {
                critical: self.vuln_summary.critical,
                major: self.vuln_summary.major,
                minor: self.vuln_summary.minor,
            },
        }
    }
}

// -----------------
// Tests (no network)
// -----------------
