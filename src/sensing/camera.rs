use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex, PoisonError,
};

use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::error::CameraError;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Facing {
    /// Back camera, pointed at the appliance.
    Environment,
    Any,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CameraRequest {
    pub facing: Facing,
    pub ideal_width: Option<u32>,
    pub ideal_height: Option<u32>,
}

impl CameraRequest {
    pub fn environment() -> Self {
        Self {
            facing: Facing::Environment,
            ideal_width: Some(1280),
            ideal_height: Some(720),
        }
    }

    pub fn any() -> Self {
        Self {
            facing: Facing::Any,
            ideal_width: None,
            ideal_height: None,
        }
    }
}

/// Handle to an open video stream. Must be handed back to the device that
/// produced it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CameraStream {
    pub id: String,
    pub facing: Facing,
}

impl CameraStream {
    pub fn new(facing: Facing) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            facing,
        }
    }
}

pub trait CameraDevice: Send + Sync {
    fn open(&self, request: &CameraRequest) -> Result<CameraStream, CameraError>;
    fn release(&self, stream: CameraStream);
}

/// Back camera first, then whatever is available.
pub fn acquire_camera(device: &dyn CameraDevice) -> Result<CameraStream, CameraError> {
    match device.open(&CameraRequest::environment()) {
        Ok(stream) => Ok(stream),
        Err(err) => {
            warn!("Environment camera unavailable ({err}), falling back to any camera");
            device.open(&CameraRequest::any())
        }
    }
}

/// Camera stand-in for headless runs. Tracks how many streams are open so
/// callers can check that every acquisition is released.
#[derive(Default)]
pub struct SimulatedCamera {
    denied: AtomicBool,
    environment_missing: AtomicBool,
    open_streams: Mutex<Vec<String>>,
    total_opened: AtomicUsize,
}

impl SimulatedCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denied() -> Self {
        let camera = Self::default();
        camera.set_denied(true);
        camera
    }

    pub fn set_denied(&self, denied: bool) {
        self.denied.store(denied, Ordering::SeqCst);
    }

    /// Simulates a device without a back camera.
    pub fn without_environment_camera(self) -> Self {
        self.environment_missing.store(true, Ordering::SeqCst);
        self
    }

    pub fn open_count(&self) -> usize {
        self.open_streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn total_opened(&self) -> usize {
        self.total_opened.load(Ordering::SeqCst)
    }
}

impl CameraDevice for SimulatedCamera {
    fn open(&self, request: &CameraRequest) -> Result<CameraStream, CameraError> {
        if self.denied.load(Ordering::SeqCst) {
            return Err(CameraError::PermissionDenied);
        }
        if request.facing == Facing::Environment && self.environment_missing.load(Ordering::SeqCst)
        {
            return Err(CameraError::NoDevice);
        }

        let stream = CameraStream::new(request.facing);
        self.open_streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stream.id.clone());
        self.total_opened.fetch_add(1, Ordering::SeqCst);
        info!("Simulated camera opened stream {} ({:?})", stream.id, stream.facing);
        Ok(stream)
    }

    fn release(&self, stream: CameraStream) {
        let mut streams = self
            .open_streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match streams.iter().position(|id| *id == stream.id) {
            Some(index) => {
                streams.remove(index);
                info!("Simulated camera released stream {}", stream.id);
            }
            None => warn!("Release of unknown camera stream {}", stream.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_environment_camera() {
        let camera = SimulatedCamera::new();
        let stream = acquire_camera(&camera).unwrap();
        assert_eq!(stream.facing, Facing::Environment);
        assert_eq!(camera.open_count(), 1);
    }

    #[test]
    fn falls_back_to_any_camera() {
        let camera = SimulatedCamera::new().without_environment_camera();
        let stream = acquire_camera(&camera).unwrap();
        assert_eq!(stream.facing, Facing::Any);
    }

    #[test]
    fn denied_permission_is_an_error() {
        let camera = SimulatedCamera::denied();
        assert_eq!(acquire_camera(&camera), Err(CameraError::PermissionDenied));
        assert_eq!(camera.open_count(), 0);
    }

    #[test]
    fn release_closes_stream() {
        let camera = SimulatedCamera::new();
        let stream = acquire_camera(&camera).unwrap();
        camera.release(stream);
        assert_eq!(camera.open_count(), 0);
        assert_eq!(camera.total_opened(), 1);
    }
}
