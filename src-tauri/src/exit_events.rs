use tauri::{AppHandle, Manager};

use crate::{append_shutdown_log, update_flow, AppContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequestDecision {
    /// Let the window close; the process is on its way out.
    Allow,
    /// Suppress the close and hide the window; the tray keeps the app alive.
    HideInstead,
}

pub fn decide_close_request(context: &AppContext) -> CloseRequestDecision {
    if context.is_quitting() {
        CloseRequestDecision::Allow
    } else {
        CloseRequestDecision::HideInstead
    }
}

/// Sets the quitting flag. Must run before any exit is requested so close
/// interception lets the window go.
pub fn begin_quit<F>(context: &AppContext, log: F)
where
    F: Fn(&str),
{
    context.mark_quitting();
    log("quit requested, exiting desktop process");
}

fn stop_backend(app_handle: &AppHandle, reason: &str) {
    let Some(context) = app_handle.try_state::<AppContext>() else {
        return;
    };
    context.mark_quitting();
    if !context.backend.is_running() {
        append_shutdown_log(&format!("{reason}; backend is not running"));
    } else {
        append_shutdown_log(&format!("{reason}; stopping backend"));
    }
    context.backend.stop(append_shutdown_log);
}

pub fn handle_exit_requested(app_handle: &AppHandle) {
    stop_backend(app_handle, "exit requested");
}

pub fn handle_exit_event(app_handle: &AppHandle) {
    stop_backend(app_handle, "desktop process exiting");
    if let Some(context) = app_handle.try_state::<AppContext>() {
        update_flow::install_pending_update(&context);
    }
}
