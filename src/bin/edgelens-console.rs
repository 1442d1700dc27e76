//! Headless front end: drives the diagnostic wizard from stdin with a
//! simulated camera. Type `help` for the command list.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use edgelens_lib::{
    diagnostic::{DiagnosticController, DiagnosticEvent, Notifier, ScanStep},
    sensing::SimulatedCamera,
    settings::SettingsStore,
    storage::{FileSlotStore, HistoryStore},
    utils::logging::init_logging,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: start | yes | no | close | history | clear | sensors | status | quit";

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::StateChanged(snapshot) => {
                if let Some(overlay) = &snapshot.overlay {
                    println!("  [overlay] {}", overlay.caption());
                }
                println!("> {}", snapshot.status);
                for line in &snapshot.recommendations {
                    println!("    - {line}");
                }
                if snapshot.state.step == ScanStep::Questioning {
                    if let Some(issue) = snapshot.state.current_issue {
                        println!("  {} - {}", issue.issue, issue.description);
                        println!("  sensor: {}", issue.sensor_reading);
                        println!("  answer with `yes` or `no`");
                    }
                }
            }
            DiagnosticEvent::HistoryUpdated { entries } => {
                println!("  history: {} entries", entries.len());
            }
            DiagnosticEvent::SensorReport(report) => {
                let sensors = report.sensors;
                println!(
                    "  sensors: {} | {:.0} °C | water {:?} | power {:?} | vibration {}",
                    sensors.name,
                    sensors.temperature_c,
                    sensors.water_level,
                    sensors.power_status,
                    sensors.vibration
                );
                for line in &report.diagnosis.recommendations {
                    println!("    - {line}");
                }
            }
        }
    }
}

fn data_dir() -> PathBuf {
    std::env::var_os("EDGELENS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".edgelens"))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data directory {}", dir.display()))?;

    let settings = SettingsStore::new(dir.join("settings.json"))?;
    let slots = FileSlotStore::new(dir.join("storage.json"))?;
    let camera = SimulatedCamera::new();
    if std::env::var("EDGELENS_DENY_CAMERA").is_ok() {
        camera.set_denied(true);
    }

    let controller = DiagnosticController::new(
        settings.diagnostics().with_env_overrides(),
        Arc::new(camera),
        HistoryStore::new(Arc::new(slots)),
        Arc::new(ConsoleNotifier),
    );

    println!("EdgeLens AR console. {HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let outcome = match line.trim() {
            "" => continue,
            "start" => controller.start_scan().map(|_| ()),
            "yes" => controller.confirm_issue().map(|_| ()),
            "no" => controller.deny_issue().map(|_| ()),
            "close" => controller.close_scan().map(|_| ()),
            "status" => {
                let snapshot = controller.get_snapshot();
                println!("> [{:?}] {}", snapshot.state.step, snapshot.status);
                Ok(())
            }
            "history" => controller.history().map(|entries| {
                if entries.is_empty() {
                    println!("  no diagnostics yet");
                }
                for entry in entries {
                    println!(
                        "  {} | {} | {} | {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        entry.device_id,
                        entry.issue,
                        entry.severity.as_str()
                    );
                }
            }),
            "clear" => controller.clear_history(),
            "sensors" => {
                println!("> Reading sensors...");
                controller.read_sensors().await.map(|_| ())
            }
            "help" => {
                println!("{HELP}");
                Ok(())
            }
            "quit" | "exit" => break,
            other => {
                println!("unknown command '{other}'. {HELP}");
                Ok(())
            }
        };

        if let Err(err) = outcome {
            println!("! {err}");
        }
    }

    controller.close_scan()?;
    Ok(())
}
