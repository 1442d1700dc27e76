use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use anyhow::Result;
use log::debug;
use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::{
    log_error, log_info, log_warn,
    models::HistoryEntry,
    sensing::{acquire_camera, CameraDevice, CameraStream, SensorReport, SENSOR_SCENARIOS},
    settings::DiagnosticSettings,
    storage::HistoryStore,
};

use super::{
    events::{DiagnosticEvent, Notifier},
    machine::{Command, DiagnosticMachine, Input, Timer},
    random::{RandomSource, ThreadRandom},
    state::DiagnosticSnapshot,
};

const ENABLE_LOGS: bool = true;

struct PendingTimer {
    ticket: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives a [`DiagnosticMachine`] on the tokio runtime: runs the camera,
/// timer and history commands it emits and publishes every resulting state.
///
/// Transitions never wait, so the wizard methods are synchronous; only the
/// sensor read sleeps. Methods that schedule timers must run inside a tokio
/// runtime.
#[derive(Clone)]
pub struct DiagnosticController {
    machine: Arc<Mutex<DiagnosticMachine>>,
    camera: Arc<dyn CameraDevice>,
    stream: Arc<Mutex<Option<CameraStream>>>,
    timer: Arc<Mutex<Option<PendingTimer>>>,
    history: HistoryStore,
    notifier: Arc<dyn Notifier>,
}

impl DiagnosticController {
    pub fn new(
        settings: DiagnosticSettings,
        camera: Arc<dyn CameraDevice>,
        history: HistoryStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            machine: Arc::new(Mutex::new(DiagnosticMachine::new(
                settings,
                Box::new(ThreadRandom::new()),
            ))),
            camera,
            stream: Arc::new(Mutex::new(None)),
            timer: Arc::new(Mutex::new(None)),
            history,
            notifier,
        }
    }

    /// Replaces the random source; only meaningful before the first scan.
    pub fn with_random(self, rng: Box<dyn RandomSource>) -> Self {
        {
            let mut machine = lock(&self.machine);
            let settings = machine.settings().clone();
            *machine = DiagnosticMachine::new(settings, rng);
        }
        self
    }

    pub fn get_snapshot(&self) -> DiagnosticSnapshot {
        lock(&self.machine).snapshot()
    }

    pub fn start_scan(&self) -> Result<DiagnosticSnapshot> {
        self.process(Input::Start)
    }

    pub fn close_scan(&self) -> Result<DiagnosticSnapshot> {
        self.process(Input::Close)
    }

    pub fn confirm_issue(&self) -> Result<DiagnosticSnapshot> {
        self.process(Input::Confirm)
    }

    pub fn deny_issue(&self) -> Result<DiagnosticSnapshot> {
        self.process(Input::Deny)
    }

    /// Camera failures noticed outside `open`, e.g. a webview whose
    /// `getUserMedia` call was rejected. Only a failure for the stream this
    /// controller still holds aborts the scan; reports about streams from
    /// earlier scans are dropped.
    pub fn report_camera_failure(
        &self,
        stream_id: &str,
        reason: String,
    ) -> Result<DiagnosticSnapshot> {
        let mut machine = lock(&self.machine);

        let held = lock(&self.stream)
            .as_ref()
            .is_some_and(|stream| stream.id == stream_id);
        if !held {
            debug!("Ignoring failure of stale camera stream {stream_id}: {reason}");
            return Ok(machine.snapshot());
        }

        self.run(&mut machine, Input::CameraFailed(reason))
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.history.list()
    }

    pub fn clear_history(&self) -> Result<()> {
        self.history.clear()?;
        log_info!("Diagnostic history cleared");
        self.notifier.notify(DiagnosticEvent::HistoryUpdated {
            entries: Vec::new(),
        });
        Ok(())
    }

    /// Simulated telemetry read, independent of the scan wizard.
    pub async fn read_sensors(&self) -> Result<SensorReport> {
        let delay = lock(&self.machine).settings().timings.sensor();
        time::sleep(delay).await;

        let report = {
            let mut machine = lock(&self.machine);
            let index = machine.random().pick_index(SENSOR_SCENARIOS.len());
            SensorReport::from(&SENSOR_SCENARIOS[index])
        };

        log_info!("Sensor scenario '{}'", report.sensors.name);
        self.notifier
            .notify(DiagnosticEvent::SensorReport(report.clone()));
        Ok(report)
    }

    pub fn update_settings(&self, settings: DiagnosticSettings) {
        lock(&self.machine).update_settings(settings);
    }

    pub fn has_pending_timer(&self) -> bool {
        lock(&self.timer).is_some()
    }

    pub fn holds_camera(&self) -> bool {
        lock(&self.stream).is_some()
    }

    /// Id of the camera stream held for the running scan.
    pub fn camera_stream_id(&self) -> Option<String> {
        lock(&self.stream).as_ref().map(|stream| stream.id.clone())
    }

    fn process(&self, input: Input) -> Result<DiagnosticSnapshot> {
        let mut machine = lock(&self.machine);
        self.run(&mut machine, input)
    }

    /// Feeds `input` and every follow-up input the commands produce through
    /// the locked machine, then publishes the resulting snapshot.
    fn run(&self, machine: &mut DiagnosticMachine, input: Input) -> Result<DiagnosticSnapshot> {
        if let Input::TimerElapsed { ticket, .. } = &input {
            self.forget_timer(*ticket);
        }

        let mut queue = VecDeque::from([input]);
        let mut history_update = None;

        while let Some(input) = queue.pop_front() {
            for command in machine.handle(input)? {
                match command {
                    Command::AcquireCamera => match self.open_camera() {
                        Ok(()) => queue.push_back(Input::CameraReady),
                        Err(reason) => queue.push_back(Input::CameraFailed(reason)),
                    },
                    Command::ReleaseCamera => self.release_camera(),
                    Command::Schedule {
                        timer,
                        ticket,
                        delay,
                    } => self.schedule(timer, ticket, delay),
                    Command::CancelTimer => self.cancel_timer(),
                    Command::Record(entry) => match self.history.append(entry) {
                        Ok(entries) => history_update = Some(entries),
                        Err(err) => {
                            log_error!("Failed to record diagnosis: {err:?}");
                            queue.push_back(Input::RecordFailed(format!("{err:#}")));
                        }
                    },
                }
            }
        }

        let snapshot = machine.snapshot();
        self.notifier
            .notify(DiagnosticEvent::StateChanged(snapshot.clone()));
        if let Some(entries) = history_update {
            self.notifier
                .notify(DiagnosticEvent::HistoryUpdated { entries });
        }

        Ok(snapshot)
    }

    fn open_camera(&self) -> Result<(), String> {
        let mut slot = lock(&self.stream);
        if let Some(previous) = slot.take() {
            self.camera.release(previous);
        }

        let stream = acquire_camera(self.camera.as_ref()).map_err(|err| err.to_string())?;
        log_info!("Camera stream {} acquired", stream.id);
        *slot = Some(stream);
        Ok(())
    }

    fn release_camera(&self) {
        if let Some(stream) = lock(&self.stream).take() {
            log_info!("Releasing camera stream {}", stream.id);
            self.camera.release(stream);
        }
    }

    fn schedule(&self, timer: Timer, ticket: u64, delay: Duration) {
        self.cancel_timer();

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let controller = self.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = time::sleep(delay) => {
                    if let Err(err) = controller.process(Input::TimerElapsed { timer, ticket }) {
                        log_warn!("{timer:?} timer failed: {err:?}");
                    }
                }
            }
        });

        *lock(&self.timer) = Some(PendingTimer {
            ticket,
            cancel,
            handle,
        });
    }

    fn cancel_timer(&self) {
        if let Some(pending) = lock(&self.timer).take() {
            pending.cancel.cancel();
            pending.handle.abort();
        }
    }

    /// Drops the slot of a timer that has fired without aborting its task.
    fn forget_timer(&self, ticket: u64) {
        let mut slot = lock(&self.timer);
        if slot.as_ref().is_some_and(|pending| pending.ticket == ticket) {
            slot.take();
        }
    }
}
