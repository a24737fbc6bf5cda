use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Scan status
// ---------------------------------------------------------------------------

/// Last-scan status as reported by the registry.
///
/// The registry encodes this as a bare integer; only three values are
/// documented. Undocumented codes land in `Other` so they fall into the
/// rules' catch-all arms instead of silently matching nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    /// `0` — never scanned / unknown to the registry.
    Unknown,
    /// `5` — a scan is currently in flight.
    Pending,
    /// `6` — last scan completed successfully.
    Ok,
    /// Any other code the registry may report.
    Other(i64),
}

impl ScanStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ScanStatus::Unknown,
            5 => ScanStatus::Pending,
            6 => ScanStatus::Ok,
            other => ScanStatus::Other(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            ScanStatus::Unknown => 0,
            ScanStatus::Pending => 5,
            ScanStatus::Ok => 6,
            ScanStatus::Other(code) => *code,
        }
    }
}

// ---------------------------------------------------------------------------
// Tag snapshot
// ---------------------------------------------------------------------------

/// Vulnerability counts carried on a tag-detail record. Reported in log
/// output, never consulted by the decision rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnCounts {
    pub critical: i64,
    pub major: i64,
    pub minor: i64,
}

/// One tag-detail record's scan state, as fetched from the registry.
///
/// A registry tag name may resolve to multiple records (one per manifest);
/// each is evaluated independently. The identity triple and the os/arch pair
/// are opaque to the rules; they exist to address the scan-trigger endpoint
/// and the log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagScanState {
    pub namespace: String,
    pub repository: String,
    pub tag: String,
    pub os: String,
    pub architecture: String,
    pub last_scan_status: ScanStatus,
    pub should_rescan: bool,
    /// Completion time of the last scan. `None` means the registry reported
    /// its "never scanned" sentinel (the proleptic year-1 zero timestamp);
    /// staleness is then measured from that sentinel, which lands hundreds
    /// of thousands of days in the past.
    pub check_completed_at: Option<DateTime<Utc>>,
    pub vulnerabilities: VulnCounts,
}

// ---------------------------------------------------------------------------
// Decision input / output
// ---------------------------------------------------------------------------

/// Immutable input for one engine evaluation.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    pub state: &'a TagScanState,
    /// Staleness threshold in days. The caller clamps this to
    /// `1..=MAX_THRESHOLD_DAYS` before the engine sees it.
    pub threshold_days: i64,
    pub now: DateTime<Utc>,
}

/// The engine's verdict for one tag-detail record.
///
/// `ForceStale` and `RescanRequested` both mean "issue a scan"; they are
/// distinguished only so the log line can name the trigger reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A scan is already in flight; never re-trigger it.
    SkipPending,
    /// The last completed scan is older than the threshold.
    ForceStale { days_since: i64 },
    /// Scan completed, not flagged, within the threshold.
    SkipUpToDate,
    /// Flagged for rescan by the registry, or never scanned.
    RescanRequested { days_since: i64 },
    /// No rule recognized the combination. Reported, not scanned.
    Unknown,
}

impl Action {
    /// True for the two variants that ask the orchestrator to issue a scan.
    pub fn requires_scan(&self) -> bool {
        matches!(
            self,
            Action::ForceStale { .. } | Action::RescanRequested { .. }
        )
    }

    /// Days since the last completed scan, for the variants that carry it.
    pub fn days_since(&self) -> Option<i64> {
        match self {
            Action::ForceStale { days_since } | Action::RescanRequested { days_since } => {
                Some(*days_since)
            }
            _ => None,
        }
    }

    /// Stable short label for the matched rule, used in log output.
    pub fn reason(&self) -> &'static str {
        match self {
            Action::SkipPending => "pending",
            Action::ForceStale { .. } => "stale",
            Action::SkipUpToDate => "up-to-date",
            Action::RescanRequested { .. } => "rescan",
            Action::Unknown => "unknown",
        }
    }
}
