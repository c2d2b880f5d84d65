use tauri::{Manager, RunEvent, WindowEvent};

use crate::{
    append_desktop_log, append_startup_log, exit_events, logging, preferences::PreferenceStore,
    runtime_paths, startup_task, window_actions, AppContext, RuntimeEnvironment,
    TransactionView, DESKTOP_LOG_FILE, MAIN_WINDOW_LABEL,
};

pub fn run() {
    let state_dir = runtime_paths::default_state_dir();
    let log_path = logging::resolve_desktop_log_path(state_dir.clone(), DESKTOP_LOG_FILE);
    logging::init(&log_path);

    let environment = RuntimeEnvironment::detect();
    append_startup_log(&format!(
        "desktop process starting: version={} environment={}",
        env!("CARGO_PKG_VERSION"),
        environment.as_str()
    ));
    append_startup_log(&format!("desktop log path: {}", log_path.display()));
    startup_task::log_startup_environment(append_startup_log);

    let preference_store = PreferenceStore::new(state_dir);
    let preferences = preference_store.load();
    append_startup_log(&format!(
        "loaded preferences: limit={} theme={}",
        preferences.limit,
        preferences.theme.as_str()
    ));
    let context = AppContext::new(
        environment,
        TransactionView::new(preferences),
        preference_store,
    );

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            append_desktop_log("second instance launched; showing existing window");
            window_actions::show_main_window(app, append_desktop_log);
        }))
        .plugin(tauri_plugin_updater::Builder::new().build())
        .plugin(tauri_plugin_dialog::init())
        .manage(context)
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_get_transactions,
            crate::desktop_bridge_commands::desktop_bridge_trigger_refresh,
            crate::desktop_bridge_commands::desktop_bridge_check_for_updates,
            crate::desktop_bridge_commands::desktop_bridge_open_external_url,
            crate::transaction_view_commands::transaction_view_init,
            crate::transaction_view_commands::transaction_view_reload,
            crate::transaction_view_commands::transaction_view_manual_refresh,
            crate::transaction_view_commands::transaction_view_set_limit,
            crate::transaction_view_commands::transaction_view_toggle_theme,
            crate::transaction_view_commands::transaction_view_click_card,
            crate::transaction_view_commands::transaction_view_mark_copied,
            crate::transaction_view_commands::transaction_view_set_threshold,
            crate::transaction_view_commands::transaction_view_report_clipboard_failure,
        ])
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }

            if let WindowEvent::CloseRequested { api, .. } = event {
                let app_handle = window.app_handle();
                let context = app_handle.state::<AppContext>();
                match exit_events::decide_close_request(&context) {
                    exit_events::CloseRequestDecision::Allow => {}
                    exit_events::CloseRequestDecision::HideInstead => {
                        api.prevent_close();
                        window_actions::hide_main_window(app_handle, append_desktop_log);
                    }
                }
            }
        })
        .setup(|app| {
            startup_task::spawn_startup_task(app.handle().clone(), append_startup_log);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { code, api, .. } => {
                // No code means the last window went away; only an explicit quit exits.
                let quitting = app_handle.state::<AppContext>().is_quitting();
                if code.is_none() && !quitting {
                    api.prevent_exit();
                    return;
                }
                exit_events::handle_exit_requested(app_handle);
            }
            RunEvent::Exit => {
                exit_events::handle_exit_event(app_handle);
            }
            _ => {}
        });
}
