//! Tauri side of the presentation layer: the webview owns the real video
//! element and canvas, Rust tells it when to open or stop the camera and what
//! to draw.

use log::warn;
use serde::Serialize;
use tauri::{AppHandle, Emitter};

use crate::{
    diagnostic::{DiagnosticEvent, Notifier},
    error::CameraError,
    sensing::{CameraDevice, CameraRequest, CameraStream},
};

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct CameraOpenRequestedEvent {
    stream_id: String,
    requests: Vec<CameraRequest>,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct CameraReleaseRequestedEvent {
    stream_id: String,
}

pub struct TauriNotifier {
    app_handle: AppHandle,
}

impl TauriNotifier {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl Notifier for TauriNotifier {
    fn notify(&self, event: DiagnosticEvent) {
        let result = match &event {
            DiagnosticEvent::StateChanged(snapshot) => {
                self.app_handle.emit("diagnostic-state-changed", snapshot)
            }
            DiagnosticEvent::HistoryUpdated { entries } => {
                self.app_handle.emit("history-updated", entries)
            }
            DiagnosticEvent::SensorReport(report) => self.app_handle.emit("sensor-report", report),
        };

        if let Err(err) = result {
            warn!("Failed to emit diagnostic event: {err}");
        }
    }
}

/// Camera whose stream lives in the webview. `open` only asks the UI to call
/// `getUserMedia` (back camera, then any camera); a rejection comes back
/// through the `report_camera_failure` command tagged with the stream id.
/// The UI stops any stream that resolves after its release was requested.
pub struct WebviewCamera {
    app_handle: AppHandle,
}

impl WebviewCamera {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl CameraDevice for WebviewCamera {
    fn open(&self, request: &CameraRequest) -> Result<CameraStream, CameraError> {
        let stream = CameraStream::new(request.facing);
        let payload = CameraOpenRequestedEvent {
            stream_id: stream.id.clone(),
            requests: vec![request.clone(), CameraRequest::any()],
        };

        self.app_handle
            .emit("camera-open-requested", payload)
            .map_err(|err| CameraError::Unavailable(err.to_string()))?;
        Ok(stream)
    }

    fn release(&self, stream: CameraStream) {
        let payload = CameraReleaseRequestedEvent {
            stream_id: stream.id,
        };
        if let Err(err) = self.app_handle.emit("camera-release-requested", payload) {
            warn!("Failed to ask webview to stop the camera: {err}");
        }
    }
}
