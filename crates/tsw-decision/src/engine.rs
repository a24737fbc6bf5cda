use crate::datediff;
use crate::types::{Action, DecisionInput, ScanStatus};

/// Upper bound for the staleness threshold. Callers clamp to
/// `1..=MAX_THRESHOLD_DAYS` before building a [`DecisionInput`].
pub const MAX_THRESHOLD_DAYS: i64 = 10_000;

/// Map one tag-state snapshot to exactly one [`Action`].
///
/// Rules are evaluated in a fixed order and the first match wins:
///
/// 1. a pending scan suppresses everything;
/// 2. staleness beyond the threshold forces a scan, ignoring both the
///    rescan flag and the status;
/// 3. unflagged + completed-ok is up to date;
/// 4. flagged (or never scanned) requests a scan;
/// 5. anything left is unclassifiable and only reported.
///
/// The function is total and pure: no input combination escapes the rules,
/// and the snapshot is never mutated.
pub fn decide(input: &DecisionInput<'_>) -> Action {
    debug_assert!(
        (1..=MAX_THRESHOLD_DAYS).contains(&input.threshold_days),
        "threshold_days must be clamped by the caller, got {}",
        input.threshold_days
    );

    let state = input.state;

    // Rule 1: a scan already in flight must never be re-triggered.
    if state.last_scan_status == ScanStatus::Pending {
        return Action::SkipPending;
    }

    // Rule 2: staleness always forces a scan. A never-scanned tag measures
    // from the registry's year-1 sentinel, which exceeds any valid
    // threshold by several orders of magnitude.
    let days_since = match state.check_completed_at {
        Some(completed) => datediff::days_between(completed, input.now),
        None => datediff::days_since_zero(input.now),
    };
    if days_since > input.threshold_days {
        return Action::ForceStale { days_since };
    }

    // Rule 3: completed ok, not flagged, within the threshold.
    if !state.should_rescan && state.last_scan_status == ScanStatus::Ok {
        return Action::SkipUpToDate;
    }

    // Rule 4: flagged for rescan. The second arm cannot be reached with
    // should_rescan=true, but the registry has been observed to report
    // should_rescan=false together with status 0 for tags that never
    // scanned; the explicit guard keeps that combination triggering even if
    // the registry's behavior drifts.
    if state.should_rescan
        || (state.last_scan_status == ScanStatus::Unknown && !state.should_rescan)
    {
        return Action::RescanRequested { days_since };
    }

    // Rule 5: unrecognized combination.
    Action::Unknown
}
