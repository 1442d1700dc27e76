use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Issue, OverlayBox};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ScanStep {
    #[default]
    Idle,
    Scanning,
    Confirming,
    Diagnosing,
    Questioning,
}

impl ScanStep {
    pub fn is_idle(&self) -> bool {
        matches!(self, ScanStep::Idle)
    }
}

/// The one live wizard session. `current_issue` is only populated while
/// diagnosing or questioning; the helpers below are the only writers.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub step: ScanStep,
    pub current_issue: Option<Issue>,
    pub session_id: Option<String>,
    pub device_id: Option<String>,
    pub scan_attempts: u32,
    pub started_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_scan(&mut self, session_id: String, started_at: DateTime<Utc>) {
        *self = Self {
            step: ScanStep::Scanning,
            session_id: Some(session_id),
            started_at: Some(started_at),
            ..Self::default()
        };
    }

    pub fn record_attempt(&mut self) -> u32 {
        self.scan_attempts = self.scan_attempts.saturating_add(1);
        self.scan_attempts
    }

    pub fn recognize(&mut self, device_id: &str) {
        self.step = ScanStep::Confirming;
        self.device_id = Some(device_id.to_string());
        self.current_issue = None;
    }

    pub fn diagnose(&mut self, issue: Issue) {
        self.step = ScanStep::Diagnosing;
        self.current_issue = Some(issue);
    }

    pub fn ask(&mut self) {
        debug_assert!(self.current_issue.is_some());
        self.step = ScanStep::Questioning;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn invariant_holds(&self) -> bool {
        let needs_issue = matches!(self.step, ScanStep::Diagnosing | ScanStep::Questioning);
        needs_issue == self.current_issue.is_some()
    }
}

/// Everything a renderer needs for one frame of the wizard.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSnapshot {
    pub state: SessionState,
    pub status: String,
    pub overlay: Option<OverlayBox>,
    /// Repair advice for the issue the user just confirmed, empty otherwise.
    pub recommendations: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ISSUE_CATALOG;

    #[test]
    fn walk_keeps_issue_invariant() {
        let mut state = SessionState::new();
        assert!(state.invariant_holds());

        state.begin_scan("s-1".into(), Utc::now());
        assert_eq!(state.step, ScanStep::Scanning);
        assert!(state.invariant_holds());

        state.recognize("KETTLE-EL-2041");
        assert!(state.invariant_holds());

        state.diagnose(ISSUE_CATALOG[2]);
        assert!(state.invariant_holds());

        state.ask();
        assert_eq!(state.step, ScanStep::Questioning);
        assert!(state.invariant_holds());

        state.reset();
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn begin_scan_clears_previous_session() {
        let mut state = SessionState::new();
        state.begin_scan("old".into(), Utc::now());
        state.record_attempt();
        state.recognize("KETTLE-EL-3307");

        state.begin_scan("new".into(), Utc::now());
        assert_eq!(state.session_id.as_deref(), Some("new"));
        assert_eq!(state.device_id, None);
        assert_eq!(state.scan_attempts, 0);
    }
}
