//! Client boundary for registry discovery and scan triggering.
//!
//! This module defines **only** the trait and its error type. The concrete
//! reqwest-backed client lives in `lib.rs`; the sweep orchestrator holds a
//! `dyn RegistryClient` so tests can substitute an in-process fake.

use std::fmt;

use async_trait::async_trait;
use tsw_decision::TagScanState;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`RegistryClient`] implementation may return.
#[derive(Debug)]
pub enum RegistryError {
    /// Network or transport failure.
    Transport(String),
    /// The registry answered with a non-success status.
    Api { status: u16, message: String },
    /// A response payload could not be decoded.
    Decode(String),
    /// The client was built with unusable configuration.
    Config(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Transport(msg) => write!(f, "transport error: {msg}"),
            RegistryError::Api { status, message } => {
                write!(f, "registry api error status={status}: {message}")
            }
            RegistryError::Decode(msg) => write!(f, "decode error: {msg}"),
            RegistryError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for RegistryError {}

// ---------------------------------------------------------------------------
// Client trait
// ---------------------------------------------------------------------------

/// Registry discovery and scan-trigger contract.
///
/// Implementations must be object-safe (`Box<dyn RegistryClient>` /
/// `Arc<dyn RegistryClient>`) and `Send + Sync` so the orchestrator can hold
/// one across await points.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Repository names within a namespace, in listing order.
    async fn list_repositories(&self, namespace: &str) -> Result<Vec<String>, RegistryError>;

    /// Tag names within a repository, in listing order.
    async fn list_tags(
        &self,
        namespace: &str,
        repository: &str,
    ) -> Result<Vec<String>, RegistryError>;

    /// Per-manifest scan-state records for one tag. A single tag name may
    /// resolve to multiple records; callers evaluate each independently.
    async fn tag_details(
        &self,
        namespace: &str,
        repository: &str,
        tag: &str,
    ) -> Result<Vec<TagScanState>, RegistryError>;

    /// Ask the registry to start a scan for the given record's manifest.
    async fn trigger_scan(&self, state: &TagScanState) -> Result<(), RegistryError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
