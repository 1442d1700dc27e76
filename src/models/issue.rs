//! Fault catalog used by the diagnostic wizard.
//!
//! The entries are static; a diagnosis picks one of them at random and the
//! user confirms or denies it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub issue: &'static str,
    pub description: &'static str,
    pub sensor_reading: &'static str,
    pub overlay_label: &'static str,
    pub confirmation_question: &'static str,
    pub advice: &'static [&'static str],
}

pub const ISSUE_CATALOG: [Issue; 4] = [
    Issue {
        issue: "Won't turn on",
        description: "No current draw detected at the base connector when the switch is pressed.",
        sensor_reading: "Power: 0 W | Base contact: open",
        overlay_label: "Power fault",
        confirmation_question: "Does the power light stay off when you flip the switch?",
        advice: &[
            "Check power cord connection",
            "Verify outlet is working",
            "Reseat the kettle on its base",
        ],
    },
    Issue {
        issue: "Leaking from the body",
        description: "Moisture pattern detected along the lower seam of the housing.",
        sensor_reading: "Base humidity: 87% | Water level dropping",
        overlay_label: "Leak detected",
        confirmation_question: "Do you see water pooling under the kettle after filling it?",
        advice: &[
            "Unplug before inspecting",
            "Check the gauge window seal for cracks",
            "Do not fill above the MAX line",
        ],
    },
    Issue {
        issue: "Takes too long to boil / Overheating",
        description: "Heating element temperature curve rises slower than expected and peaks too high.",
        sensor_reading: "Element temp: 105 °C | Boil time: 6m40s",
        overlay_label: "Thermal anomaly",
        confirmation_question: "Does a full kettle take more than five minutes to boil?",
        advice: &[
            "Allow cooling period",
            "Descale the heating plate",
            "Check for blockages around the element",
        ],
    },
    Issue {
        issue: "Auto-shutoff not working",
        description: "Steam sensor did not trigger shutoff after the water reached boiling point.",
        sensor_reading: "Steam vent: 100 °C for 90s | Switch: still on",
        overlay_label: "Shutoff failure",
        confirmation_question: "Does the kettle keep boiling after the water is ready?",
        advice: &[
            "Stop using the kettle until repaired",
            "Make sure the lid is fully closed",
            "Clear the steam vent channel",
        ],
    },
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    #[serde(rename = "CRITICAL")]
    Critical,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MODERATE")]
    Moderate,
    #[serde(rename = "Good")]
    Good,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Moderate => "MODERATE",
            Severity::Good => "Good",
        }
    }
}

/// Keyword classification of an issue name. Matching ignores case so that
/// "Leaking" hits the "leak" keyword.
pub fn classify_severity(issue: &str) -> Severity {
    let normalized = issue.to_lowercase();
    let has = |keyword: &str| normalized.contains(keyword);

    if has("turn on") || has("shutoff") {
        Severity::Critical
    } else if has("leak") || has("overheating") {
        Severity::High
    } else {
        Severity::Moderate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_issues_classify_by_keyword() {
        assert_eq!(classify_severity("Won't turn on"), Severity::Critical);
        assert_eq!(classify_severity("Leaking from the body"), Severity::High);
        assert_eq!(
            classify_severity("Takes too long to boil / Overheating"),
            Severity::High
        );
        assert_eq!(
            classify_severity("Auto-shutoff not working"),
            Severity::Critical
        );
    }

    #[test]
    fn unknown_issue_is_moderate() {
        assert_eq!(classify_severity("Lid hinge squeaks"), Severity::Moderate);
        assert_eq!(classify_severity(""), Severity::Moderate);
    }

    #[test]
    fn critical_keywords_win_over_high() {
        assert_eq!(
            classify_severity("Leak near shutoff switch"),
            Severity::Critical
        );
    }

    #[test]
    fn severity_serializes_with_display_names() {
        let json = serde_json::to_string(&[
            Severity::Critical,
            Severity::High,
            Severity::Moderate,
            Severity::Good,
        ])
        .unwrap();
        assert_eq!(json, r#"["CRITICAL","HIGH","MODERATE","Good"]"#);
    }
}
