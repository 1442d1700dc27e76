#[cfg(feature = "desktop")]
mod desktop;
pub mod diagnostic;
pub mod error;
pub mod models;
pub mod sensing;
pub mod settings;
pub mod storage;
pub mod utils;

#[cfg(feature = "desktop")]
pub use app::run;

#[cfg(feature = "desktop")]
mod app {
    use std::sync::Arc;

    use tauri::Manager;

    use crate::{
        desktop::{TauriNotifier, WebviewCamera},
        diagnostic::{
            commands::{
                clear_history, close_scan, confirm_issue, deny_issue, get_diagnostic_state,
                get_history, get_settings, read_sensors, report_camera_failure, start_scan,
                update_settings,
            },
            DiagnosticController,
        },
        settings::SettingsStore,
        storage::{FileSlotStore, HistoryStore},
        utils::logging::init_logging,
    };

    pub(crate) struct AppState {
        pub(crate) diagnostics: DiagnosticController,
        pub(crate) settings: SettingsStore,
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        init_logging();

        log::info!("EdgeLens starting up...");

        tauri::Builder::default()
            .plugin(tauri_plugin_opener::init())
            .setup(|app| {
                let result = (|| -> anyhow::Result<()> {
                    let app_data_dir = app
                        .path()
                        .app_data_dir()
                        .map_err(|err| anyhow::anyhow!(err))?;
                    std::fs::create_dir_all(&app_data_dir)?;

                    let settings_store = SettingsStore::new(app_data_dir.join("settings.json"))?;
                    let slots = FileSlotStore::new(app_data_dir.join("storage.json"))?;

                    let controller = DiagnosticController::new(
                        settings_store.diagnostics().with_env_overrides(),
                        Arc::new(WebviewCamera::new(app.handle().clone())),
                        HistoryStore::new(Arc::new(slots)),
                        Arc::new(TauriNotifier::new(app.handle().clone())),
                    );

                    app.manage(AppState {
                        diagnostics: controller,
                        settings: settings_store,
                    });

                    Ok(())
                })();

                result.map_err(|err| err.into())
            })
            .invoke_handler(tauri::generate_handler![
                get_diagnostic_state,
                start_scan,
                close_scan,
                confirm_issue,
                deny_issue,
                report_camera_failure,
                get_history,
                clear_history,
                read_sensors,
                get_settings,
                update_settings,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}

#[cfg(feature = "desktop")]
pub(crate) use app::AppState;
