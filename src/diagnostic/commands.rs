use tauri::State;

use crate::{
    diagnostic::{DiagnosticController, DiagnosticSnapshot},
    models::HistoryEntry,
    sensing::SensorReport,
    settings::DiagnosticSettings,
};

use crate::AppState;

fn controller_from_state(state: &State<'_, AppState>) -> DiagnosticController {
    state.diagnostics.clone()
}

#[tauri::command]
pub async fn get_diagnostic_state(
    state: State<'_, AppState>,
) -> Result<DiagnosticSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.get_snapshot())
}

#[tauri::command]
pub async fn start_scan(state: State<'_, AppState>) -> Result<DiagnosticSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.start_scan().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn close_scan(state: State<'_, AppState>) -> Result<DiagnosticSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.close_scan().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn confirm_issue(state: State<'_, AppState>) -> Result<DiagnosticSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.confirm_issue().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn deny_issue(state: State<'_, AppState>) -> Result<DiagnosticSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.deny_issue().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn report_camera_failure(
    state: State<'_, AppState>,
    stream_id: String,
    reason: String,
) -> Result<DiagnosticSnapshot, String> {
    let controller = controller_from_state(&state);
    controller
        .report_camera_failure(&stream_id, reason)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_history(state: State<'_, AppState>) -> Result<Vec<HistoryEntry>, String> {
    let controller = controller_from_state(&state);
    controller.history().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn clear_history(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.clear_history().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn read_sensors(state: State<'_, AppState>) -> Result<SensorReport, String> {
    let controller = controller_from_state(&state);
    controller.read_sensors().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_settings(state: State<'_, AppState>) -> Result<DiagnosticSettings, String> {
    Ok(state.settings.diagnostics())
}

#[tauri::command]
pub async fn update_settings(
    state: State<'_, AppState>,
    settings: DiagnosticSettings,
) -> Result<DiagnosticSettings, String> {
    let saved = state
        .settings
        .update_diagnostics(settings)
        .map_err(|e| e.to_string())?;
    let controller = controller_from_state(&state);
    controller.update_settings(saved.clone().with_env_overrides());
    Ok(saved)
}
