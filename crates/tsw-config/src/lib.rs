use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use tsw_decision::MAX_THRESHOLD_DAYS;

/// Known secret-like prefixes. If a namespace entry starts with one of
/// these, someone pasted a credential where a namespace belongs; we abort
/// with CONFIG_SECRET_DETECTED instead of sending it to the registry.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",        // Stripe / OpenAI style
    "sk_live",    // Stripe live
    "sk_test",    // Stripe test
    "AKIA",       // AWS access key ID
    "-----BEGIN", // PEM private keys
    "ghp_",       // GitHub PAT
    "gho_",       // GitHub OAuth
    "glpat-",     // GitLab PAT
    "xoxb-",      // Slack bot token
    "xoxp-",      // Slack user token
];

/// Default namespaces file name, relative to the working directory.
pub const DEFAULT_NAMESPACES_FILE: &str = "namespaces.yaml";

// ---------------------------------------------------------------------------
// Namespaces file
// ---------------------------------------------------------------------------

/// The operator-maintained list of registry namespaces to sweep.
///
/// File format (capitalized key, matching the deployed files):
///
/// ```yaml
/// Namespaces:
///   - team-a
///   - team-b
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Namespaces {
    #[serde(rename = "Namespaces")]
    pub namespaces: Vec<String>,
}

/// Read and validate the namespaces file. A failure here is fatal to the
/// run: with no namespaces there is no work.
pub fn load_namespaces(path: &str) -> Result<Namespaces> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read namespaces file: {path}"))?;
    let ns: Namespaces =
        serde_yaml::from_str(&raw).with_context(|| format!("invalid namespaces yaml: {path}"))?;

    for entry in &ns.namespaces {
        if looks_like_secret(entry) {
            bail!("CONFIG_SECRET_DETECTED namespace entry looks like a credential value=REDACTED");
        }
    }
    Ok(ns)
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

// ---------------------------------------------------------------------------
// Threshold clamp
// ---------------------------------------------------------------------------

/// Clamp the staleness threshold into `1..=MAX_THRESHOLD_DAYS`.
///
/// Out-of-range values are never rejected; they clamp to the maximum with a
/// warning, so a typo in `--days` degrades to "only rescan what the
/// registry flags" instead of killing the sweep.
pub fn clamp_threshold_days(requested: i64) -> i64 {
    if requested <= 0 || requested > MAX_THRESHOLD_DAYS {
        tracing::warn!(
            requested,
            max = MAX_THRESHOLD_DAYS,
            "invalid number of days, must be between 1 and {MAX_THRESHOLD_DAYS}; using the maximum"
        );
        return MAX_THRESHOLD_DAYS;
    }
    requested
}

// ---------------------------------------------------------------------------
// Effective settings
// ---------------------------------------------------------------------------

/// The effective per-run settings, echoed (fingerprinted) at run start so a
/// sweep's output can be attributed to its exact configuration.
///
/// The access token is deliberately not part of this struct; it can never
/// reach the fingerprint input or a log line through it.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSettings {
    pub registry_url: String,
    pub user: String,
    pub namespaces_file: String,
    pub threshold_days: i64,
    pub dry_run: bool,
}

impl SweepSettings {
    /// Sha256 over the canonical JSON form of the settings.
    pub fn fingerprint(&self) -> Result<String> {
        let canonical = serde_json::to_string(self).context("settings serialize failed")?;
        Ok(sha256_hex(canonical.as_bytes()))
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
