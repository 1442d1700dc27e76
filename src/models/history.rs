use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::issue::{classify_severity, Issue, Severity};

pub const NO_ISSUE_LABEL: &str = "No issue found";

/// One completed diagnostic session as persisted in the history slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub device_id: String,
    pub issue: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn diagnosed(device_id: impl Into<String>, issue: &Issue, at: DateTime<Utc>) -> Self {
        Self {
            device_id: device_id.into(),
            issue: issue.issue.to_string(),
            severity: classify_severity(issue.issue),
            timestamp: at,
        }
    }

    pub fn no_issue(device_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            device_id: device_id.into(),
            issue: NO_ISSUE_LABEL.to_string(),
            severity: Severity::Good,
            timestamp: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ISSUE_CATALOG;

    #[test]
    fn diagnosed_entry_takes_severity_from_issue_text() {
        let entry = HistoryEntry::diagnosed("KETTLE-EL-2041", &ISSUE_CATALOG[1], Utc::now());
        assert_eq!(entry.issue, "Leaking from the body");
        assert_eq!(entry.severity, Severity::High);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let entry = HistoryEntry::no_issue("KETTLE-EL-3307", Utc::now());
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["deviceId"], "KETTLE-EL-3307");
        assert_eq!(value["issue"], NO_ISSUE_LABEL);
        assert_eq!(value["severity"], "Good");
        assert!(value["timestamp"].is_string());
    }
}
