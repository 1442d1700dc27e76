use serde::Serialize;

use crate::{models::HistoryEntry, sensing::SensorReport};

use super::state::DiagnosticSnapshot;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiagnosticEvent {
    StateChanged(DiagnosticSnapshot),
    HistoryUpdated { entries: Vec<HistoryEntry> },
    SensorReport(SensorReport),
}

/// Rendering adapter fed by the controller. Called while the controller's
/// state lock is held, so implementations must not call back into it.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: DiagnosticEvent);
}

#[cfg(test)]
pub(crate) mod recording {
    use std::sync::Mutex;

    use super::{DiagnosticEvent, Notifier};

    #[derive(Default)]
    pub struct RecordingNotifier {
        events: Mutex<Vec<DiagnosticEvent>>,
    }

    impl RecordingNotifier {
        pub fn events(&self) -> Vec<DiagnosticEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, event: DiagnosticEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}
