use thiserror::Error;

/// Shown to the user whenever the camera cannot be acquired, whatever the cause.
pub const CAMERA_ERROR_MESSAGE: &str = "Camera access required for AR";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device available")]
    NoDevice,
    #[error("camera unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiagnosticError {
    #[error("scan already active")]
    ScanAlreadyActive,
    #[error("no issue is awaiting an answer")]
    NotAwaitingAnswer,
}
