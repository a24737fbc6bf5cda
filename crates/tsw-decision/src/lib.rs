//! tsw-decision
//!
//! Pure rescan decision core: the calendar-day-difference algorithm and the
//! ordered rule set that maps a tag's scan-state snapshot to an [`Action`].
//! No I/O lives here; callers supply the snapshot, the threshold, and "now".

mod datediff;
mod engine;
mod types;

pub use datediff::{calendar_diff, days_between, days_since_zero, CalendarDelta};
pub use engine::{decide, MAX_THRESHOLD_DAYS};
pub use types::{Action, DecisionInput, ScanStatus, TagScanState, VulnCounts};
