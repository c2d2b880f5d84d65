use tauri::AppHandle;

/// Runs `action` on the main thread, where window and tray creation must happen.
pub fn run_on_main_thread_dispatch<F>(
    app_handle: &AppHandle,
    task_name: &str,
    action: F,
) -> Result<(), String>
where
    F: FnOnce(&AppHandle) + Send + 'static,
{
    let main_app = app_handle.clone();
    app_handle
        .run_on_main_thread(move || action(&main_app))
        .map_err(|error| format!("Failed to dispatch '{task_name}' to main thread: {error}"))
}
