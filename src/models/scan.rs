use serde::Serialize;

const KNOWN_DEVICE_PREFIX: &str = "KETTLE-";

/// A simulated detection result: the code read from the frame plus what the
/// "model" thinks it is looking at.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanCandidate {
    pub code: &'static str,
    pub object: &'static str,
    pub confidence: u8,
}

pub const SCAN_CANDIDATES: [ScanCandidate; 4] = [
    ScanCandidate {
        code: "KETTLE-EL-2041",
        object: "Kettle",
        confidence: 85,
    },
    ScanCandidate {
        code: "KETTLE-EL-3307",
        object: "Kettle",
        confidence: 92,
    },
    ScanCandidate {
        code: "",
        object: "Background",
        confidence: 15,
    },
    ScanCandidate {
        code: "APPL-GEN-0178",
        object: "Appliance",
        confidence: 78,
    },
];

pub fn is_known_device(code: &str) -> bool {
    code.starts_with(KNOWN_DEVICE_PREFIX) && code.len() > KNOWN_DEVICE_PREFIX.len()
}

/// Overlay rectangle drawn over the camera feed. Position is relative to the
/// video size, width/height are in canvas pixels.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayBox {
    pub x_ratio: f32,
    pub y_ratio: f32,
    pub width: u32,
    pub height: u32,
    pub label: String,
    pub confidence: Option<u8>,
}

impl OverlayBox {
    pub fn labeled(label: impl Into<String>, confidence: Option<u8>) -> Self {
        Self {
            x_ratio: 0.3,
            y_ratio: 0.3,
            width: 200,
            height: 150,
            label: label.into(),
            confidence,
        }
    }

    pub fn for_candidate(candidate: &ScanCandidate) -> Self {
        Self::labeled(candidate.object, Some(candidate.confidence))
    }

    /// Text drawn inside the label strip above the rectangle.
    pub fn caption(&self) -> String {
        match self.confidence {
            Some(confidence) => format!("{} ({}%)", self.label, confidence),
            None => self.label.clone(),
        }
    }
}
