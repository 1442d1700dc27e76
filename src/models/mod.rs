pub mod history;
pub mod issue;
pub mod scan;

pub use history::{HistoryEntry, NO_ISSUE_LABEL};
pub use issue::{classify_severity, Issue, Severity, ISSUE_CATALOG};
pub use scan::{is_known_device, OverlayBox, ScanCandidate, SCAN_CANDIDATES};
