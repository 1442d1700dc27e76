#[cfg(feature = "desktop")]
pub(crate) mod commands;
pub mod controller;
pub mod events;
pub mod machine;
pub mod random;
pub mod state;

pub use controller::DiagnosticController;
pub use events::{DiagnosticEvent, Notifier};
pub use machine::{Command, DiagnosticMachine, Input, Timer};
pub use random::{RandomSource, ThreadRandom};
pub use state::{DiagnosticSnapshot, ScanStep, SessionState};
