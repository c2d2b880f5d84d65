use tauri::{AppHandle, Emitter};

use crate::{main_window, MAIN_WINDOW_LABEL, TRAY_REFRESH_EVENT};

pub fn show_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    main_window::show_main_window(app_handle, &log);
}

pub fn hide_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    main_window::hide_main_window(app_handle, &log);
    log("main window hidden; tray icon remains active");
}

/// Signals the rendered view to re-fetch. The view owns the actual request.
pub fn request_view_refresh<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    match app_handle.emit_to(MAIN_WINDOW_LABEL, TRAY_REFRESH_EVENT, ()) {
        Ok(()) => log("refresh requested from tray"),
        Err(error) => log(&format!("failed to emit {TRAY_REFRESH_EVENT} event: {error}")),
    }
}
