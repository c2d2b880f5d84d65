use tauri::AppHandle;

use crate::{append_desktop_log, transaction_view_flow, CardClickTarget, ViewSnapshot};

#[tauri::command]
pub(crate) async fn transaction_view_init(app_handle: AppHandle) -> Result<ViewSnapshot, String> {
    transaction_view_flow::init(&app_handle).await
}

#[tauri::command]
pub(crate) async fn transaction_view_reload(app_handle: AppHandle) -> Result<ViewSnapshot, String> {
    transaction_view_flow::load_transactions(&app_handle).await
}

#[tauri::command]
pub(crate) async fn transaction_view_manual_refresh(
    app_handle: AppHandle,
) -> Result<ViewSnapshot, String> {
    transaction_view_flow::manual_refresh(&app_handle).await
}

#[tauri::command]
pub(crate) async fn transaction_view_set_limit(
    app_handle: AppHandle,
    limit: u32,
) -> Result<ViewSnapshot, String> {
    transaction_view_flow::set_limit(&app_handle, limit).await
}

#[tauri::command]
pub(crate) fn transaction_view_toggle_theme(app_handle: AppHandle) -> Result<ViewSnapshot, String> {
    transaction_view_flow::toggle_theme(&app_handle)
}

#[tauri::command]
pub(crate) fn transaction_view_click_card(
    app_handle: AppHandle,
    index: usize,
    target: CardClickTarget,
) -> Result<ViewSnapshot, String> {
    transaction_view_flow::click_card(&app_handle, index, target)
}

#[tauri::command]
pub(crate) fn transaction_view_mark_copied(
    app_handle: AppHandle,
    tx_hash: String,
) -> Result<ViewSnapshot, String> {
    transaction_view_flow::mark_copied(&app_handle, &tx_hash)
}

#[tauri::command]
pub(crate) async fn transaction_view_set_threshold(
    app_handle: AppHandle,
    amount: f64,
) -> Result<ViewSnapshot, String> {
    transaction_view_flow::set_threshold(&app_handle, amount).await
}

#[tauri::command]
pub(crate) fn transaction_view_report_clipboard_failure(reason: Option<String>) {
    append_desktop_log(&format!(
        "failed to copy transaction hash: {}",
        reason.as_deref().unwrap_or("unknown error")
    ));
}
