use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{DiagnosticError, CAMERA_ERROR_MESSAGE},
    models::{is_known_device, HistoryEntry, Issue, OverlayBox, ISSUE_CATALOG, SCAN_CANDIDATES},
    settings::DiagnosticSettings,
};

use super::{
    random::RandomSource,
    state::{DiagnosticSnapshot, ScanStep, SessionState},
};

pub const READY_STATUS: &str = "EdgeLens AR - Ready to scan";
const REQUESTING_CAMERA_STATUS: &str = "Requesting camera...";
const SCANNING_STATUS: &str = "Scanning for appliance code...";
const RESCANNING_STATUS: &str = "Code not recognized - scanning again...";
const REANALYSIS_STATUS: &str = "Checking other possible causes...";
const NO_ISSUE_STATUS: &str = "No issue found - appliance looks healthy";
const CLOSED_STATUS: &str = "Scan closed";
const RECORD_FAILED_STATUS: &str = "Diagnosis could not be saved to history";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Timer {
    /// Scanning: read a code from the frame.
    Detect,
    /// Confirming: pick the issue to present.
    Confirm,
    /// Diagnosing: present the question.
    Analyze,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Start,
    CameraReady,
    CameraFailed(String),
    TimerElapsed { timer: Timer, ticket: u64 },
    Confirm,
    Deny,
    Close,
    /// The history write for the last `Record` command did not persist.
    RecordFailed(String),
}

/// Side effects requested by a transition, in the order they must run.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AcquireCamera,
    ReleaseCamera,
    Schedule {
        timer: Timer,
        ticket: u64,
        delay: Duration,
    },
    CancelTimer,
    Record(HistoryEntry),
}

/// Pure transition core of the wizard: no I/O, no clocks besides stamping
/// history entries, no tasks. The controller feeds it inputs and carries out
/// the returned commands.
pub struct DiagnosticMachine {
    state: SessionState,
    status: String,
    overlay: Option<OverlayBox>,
    recommendations: Vec<&'static str>,
    settings: DiagnosticSettings,
    rng: Box<dyn RandomSource>,
    pending: Option<(Timer, u64)>,
    next_ticket: u64,
}

impl DiagnosticMachine {
    pub fn new(settings: DiagnosticSettings, rng: Box<dyn RandomSource>) -> Self {
        Self {
            state: SessionState::new(),
            status: READY_STATUS.to_string(),
            overlay: None,
            recommendations: Vec::new(),
            settings: settings.sanitized(),
            rng,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn settings(&self) -> &DiagnosticSettings {
        &self.settings
    }

    pub fn pending_timer(&self) -> Option<Timer> {
        self.pending.map(|(timer, _)| timer)
    }

    pub fn snapshot(&self) -> DiagnosticSnapshot {
        DiagnosticSnapshot {
            state: self.state.clone(),
            status: self.status.clone(),
            overlay: self.overlay.clone(),
            recommendations: self.recommendations.clone(),
        }
    }

    /// New settings apply from the next scheduled delay on.
    pub fn update_settings(&mut self, settings: DiagnosticSettings) {
        self.settings = settings.sanitized();
    }

    pub fn random(&mut self) -> &mut dyn RandomSource {
        self.rng.as_mut()
    }

    pub fn handle(&mut self, input: Input) -> Result<Vec<Command>, DiagnosticError> {
        let step_before = self.state.step;
        let commands = match input {
            Input::Start => self.on_start()?,
            Input::CameraReady => self.on_camera_ready(),
            Input::CameraFailed(reason) => self.on_camera_failed(&reason),
            Input::TimerElapsed { timer, ticket } => self.on_timer(timer, ticket),
            Input::Confirm => self.on_confirm()?,
            Input::Deny => self.on_deny()?,
            Input::Close => self.on_close(),
            Input::RecordFailed(reason) => self.on_record_failed(&reason),
        };

        if step_before != self.state.step {
            info!("Diagnostic step {:?} -> {:?}", step_before, self.state.step);
        }
        debug_assert!(self.state.invariant_holds());
        Ok(commands)
    }

    fn on_start(&mut self) -> Result<Vec<Command>, DiagnosticError> {
        if !self.state.step.is_idle() {
            return Err(DiagnosticError::ScanAlreadyActive);
        }

        self.state.begin_scan(Uuid::new_v4().to_string(), Utc::now());
        self.status = REQUESTING_CAMERA_STATUS.to_string();
        self.overlay = None;
        self.recommendations.clear();
        Ok(vec![Command::AcquireCamera])
    }

    fn on_camera_ready(&mut self) -> Vec<Command> {
        if self.state.step != ScanStep::Scanning || self.pending.is_some() {
            debug!("Ignoring camera ready in step {:?}", self.state.step);
            return Vec::new();
        }

        self.status = SCANNING_STATUS.to_string();
        let delay = self.settings.timings.scan_detect();
        vec![self.schedule(Timer::Detect, delay)]
    }

    fn on_camera_failed(&mut self, reason: &str) -> Vec<Command> {
        if self.state.step.is_idle() {
            debug!("Ignoring camera failure while idle: {reason}");
            return Vec::new();
        }

        warn!("Camera acquisition failed: {reason}");
        self.finish(Vec::new(), CAMERA_ERROR_MESSAGE)
    }

    fn on_timer(&mut self, timer: Timer, ticket: u64) -> Vec<Command> {
        if self.pending != Some((timer, ticket)) {
            debug!("Ignoring stale {:?} timer (ticket {ticket})", timer);
            return Vec::new();
        }
        self.pending = None;

        match timer {
            Timer::Detect => self.on_detect(),
            Timer::Confirm => self.on_device_confirmed(),
            Timer::Analyze => self.on_analysis_done(),
        }
    }

    fn on_detect(&mut self) -> Vec<Command> {
        let attempt = self.state.record_attempt();
        let candidate = SCAN_CANDIDATES[self.rng.pick_index(SCAN_CANDIDATES.len())];

        if is_known_device(candidate.code) {
            info!(
                "Recognized device {} on attempt {attempt} ({}%)",
                candidate.code, candidate.confidence
            );
            self.state.recognize(candidate.code);
            self.overlay = Some(OverlayBox::for_candidate(&candidate));
            self.status = format!("Device recognized: {}", candidate.code);
            let delay = self.settings.timings.confirm();
            return vec![self.schedule(Timer::Confirm, delay)];
        }

        debug!(
            "Attempt {attempt} saw {} ({}%), not a known device",
            candidate.object, candidate.confidence
        );

        if let Some(max) = self.settings.max_scan_attempts {
            if attempt >= max {
                warn!("No known device after {attempt} attempts, ending scan");
                let status = format!("No appliance recognized after {attempt} attempts");
                return self.finish(Vec::new(), &status);
            }
        }

        self.overlay = None;
        self.status = RESCANNING_STATUS.to_string();
        let delay = self.settings.timings.scan_retry();
        vec![self.schedule(Timer::Detect, delay)]
    }

    fn on_device_confirmed(&mut self) -> Vec<Command> {
        let issue = ISSUE_CATALOG[self.rng.pick_index(ISSUE_CATALOG.len())];
        self.present_candidate(issue, self.settings.timings.analysis())
    }

    fn on_analysis_done(&mut self) -> Vec<Command> {
        let Some(issue) = self.state.current_issue else {
            warn!("Analysis finished without an issue, ending scan");
            return self.finish(Vec::new(), CLOSED_STATUS);
        };

        self.state.ask();
        self.status = issue.confirmation_question.to_string();
        Vec::new()
    }

    fn on_confirm(&mut self) -> Result<Vec<Command>, DiagnosticError> {
        let issue = self.awaiting_answer()?;
        let entry = HistoryEntry::diagnosed(self.device_id(), &issue, Utc::now());
        let status = format!(
            "Diagnosis saved: {} ({})",
            issue.issue,
            entry.severity.as_str()
        );
        let commands = self.finish(vec![Command::Record(entry)], &status);
        self.recommendations = issue.advice.to_vec();
        Ok(commands)
    }

    fn on_deny(&mut self) -> Result<Vec<Command>, DiagnosticError> {
        let denied = self.awaiting_answer()?;

        let remaining: Vec<Issue> = ISSUE_CATALOG
            .iter()
            .copied()
            .filter(|issue| *issue != denied)
            .collect();

        if !remaining.is_empty() && self.rng.chance(self.settings.deny_reroll_probability) {
            let next = remaining[self.rng.pick_index(remaining.len())];
            info!("'{}' denied, trying '{}'", denied.issue, next.issue);
            let commands = self.present_candidate(next, self.settings.timings.reanalysis());
            self.status = REANALYSIS_STATUS.to_string();
            return Ok(commands);
        }

        info!("'{}' denied, no further candidates", denied.issue);
        let entry = HistoryEntry::no_issue(self.device_id(), Utc::now());
        Ok(self.finish(vec![Command::Record(entry)], NO_ISSUE_STATUS))
    }

    fn on_close(&mut self) -> Vec<Command> {
        if self.state.step.is_idle() {
            return Vec::new();
        }
        self.finish(Vec::new(), CLOSED_STATUS)
    }

    fn on_record_failed(&mut self, reason: &str) -> Vec<Command> {
        warn!("Diagnosis was not recorded: {reason}");
        self.status = RECORD_FAILED_STATUS.to_string();
        Vec::new()
    }

    fn awaiting_answer(&self) -> Result<Issue, DiagnosticError> {
        match (self.state.step, self.state.current_issue) {
            (ScanStep::Questioning, Some(issue)) => Ok(issue),
            _ => Err(DiagnosticError::NotAwaitingAnswer),
        }
    }

    fn device_id(&self) -> String {
        self.state.device_id.clone().unwrap_or_default()
    }

    fn present_candidate(&mut self, issue: Issue, delay: Duration) -> Vec<Command> {
        self.state.diagnose(issue);
        self.overlay = Some(OverlayBox::labeled(issue.overlay_label, None));
        self.status = format!("Analyzing {}...", self.device_id());
        vec![self.schedule(Timer::Analyze, delay)]
    }

    fn schedule(&mut self, timer: Timer, delay: Duration) -> Command {
        self.next_ticket = self.next_ticket.wrapping_add(1);
        let ticket = self.next_ticket;
        self.pending = Some((timer, ticket));
        Command::Schedule {
            timer,
            ticket,
            delay,
        }
    }

    /// Leaves the session: drops any pending timer, hands the camera back and
    /// returns to idle with `status` shown.
    fn finish(&mut self, mut commands: Vec<Command>, status: &str) -> Vec<Command> {
        self.pending = None;
        commands.push(Command::CancelTimer);
        commands.push(Command::ReleaseCamera);
        self.state.reset();
        self.overlay = None;
        self.recommendations.clear();
        self.status = status.to_string();
        commands
    }
}
