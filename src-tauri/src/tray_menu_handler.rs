use tauri::{AppHandle, Manager};

use crate::{
    append_desktop_log, append_shutdown_log, exit_events, tray_actions, window_actions, AppContext,
};

pub fn handle_tray_menu_event(app_handle: &AppHandle, menu_id: &str) {
    match tray_actions::action_from_menu_id(menu_id) {
        Some(tray_actions::TrayMenuAction::ShowApp) => {
            window_actions::show_main_window(app_handle, append_desktop_log)
        }
        Some(tray_actions::TrayMenuAction::RefreshNow) => {
            window_actions::request_view_refresh(app_handle, append_desktop_log)
        }
        Some(tray_actions::TrayMenuAction::Quit) => {
            let context = app_handle.state::<AppContext>();
            exit_events::begin_quit(&context, append_shutdown_log);
            app_handle.exit(0);
        }
        None => append_desktop_log(&format!("ignoring unknown tray menu id: {menu_id}")),
    }
}
