use std::{path::PathBuf, thread, time::Duration};

use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};

use crate::{
    append_desktop_log, launch_plan, main_window, runtime_paths, tray_setup, ui_dispatch,
    update_flow, AppContext, BackendSupervisor, LaunchError, RuntimeEnvironment,
    APP_DISPLAY_NAME, STARTUP_WINDOW_DELAY,
};

const BINARY_MISSING_MESSAGE: &str = "Backend binary not found!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStartOutcome {
    Started,
    /// The packaged binary is absent. The user is told; supervision ends.
    BinaryMissing(PathBuf),
    /// Anything else that kept the backend from starting. Logged only.
    Failed(String),
}

fn show_startup_error(app_handle: &AppHandle, message: &str) {
    app_handle
        .dialog()
        .message(message)
        .title(format!("{APP_DISPLAY_NAME} - Error"))
        .kind(MessageDialogKind::Error)
        .buttons(MessageDialogButtons::Ok)
        .blocking_show();
}

/// Resolves the launch plan and spawns the backend under `supervisor`.
pub fn launch_backend<F>(
    supervisor: &BackendSupervisor,
    environment: RuntimeEnvironment,
    resource_dir: Result<PathBuf, String>,
    log: F,
) -> BackendStartOutcome
where
    F: Fn(&str) + Copy,
{
    log(&format!("starting backend ({} mode)", environment.as_str()));

    let plan = match launch_plan::resolve_launch_plan(environment, resource_dir) {
        Ok(plan) => plan,
        Err(LaunchError::BinaryMissing(path)) => {
            log(&format!("backend binary not found: {}", path.display()));
            return BackendStartOutcome::BinaryMissing(path);
        }
        Err(error) => {
            let message = format!("failed to resolve backend launch plan: {error}");
            log(&message);
            return BackendStartOutcome::Failed(message);
        }
    };

    match supervisor.start(&plan, log) {
        Ok(()) => BackendStartOutcome::Started,
        Err(error) => {
            log(&error);
            BackendStartOutcome::Failed(error)
        }
    }
}

/// Backend first, then the delay, then the UI. The UI is presented whatever the
/// backend outcome was.
pub fn run_startup_sequence(
    start_backend: impl FnOnce() -> BackendStartOutcome,
    show_error: impl FnOnce(&str),
    delay: Duration,
    present_ui: impl FnOnce(),
) -> BackendStartOutcome {
    let outcome = start_backend();
    if let BackendStartOutcome::BinaryMissing(_) = outcome {
        show_error(BINARY_MISSING_MESSAGE);
    }
    // Give the backend a head start before the view begins polling.
    thread::sleep(delay);
    present_ui();
    outcome
}

fn present_ui(app_handle: &AppHandle, log: fn(&str)) {
    let dispatched = ui_dispatch::run_on_main_thread_dispatch(
        app_handle,
        "create main window and tray",
        move |main_app| {
            if let Err(error) = main_window::create_main_window(main_app, log) {
                log(&error);
            }
            if let Err(error) = tray_setup::setup_tray(main_app) {
                log(&format!("failed to initialize tray: {error}"));
            }
            update_flow::spawn_update_scheduler(main_app.clone());
        },
    );
    if let Err(error) = dispatched {
        log(&error);
    }
}

pub fn spawn_startup_task(app_handle: AppHandle, log: fn(&str)) {
    let spawned = thread::Builder::new()
        .name("desktop-startup".to_string())
        .spawn(move || {
            run_startup_sequence(
                || {
                    let context = app_handle.state::<AppContext>();
                    let resource_dir = app_handle
                        .path()
                        .resource_dir()
                        .map_err(|error| error.to_string());
                    launch_backend(&context.backend, context.environment, resource_dir, log)
                },
                |message| show_startup_error(&app_handle, message),
                STARTUP_WINDOW_DELAY,
                || present_ui(&app_handle, log),
            );
        });

    if let Err(error) = spawned {
        append_desktop_log(&format!("failed to spawn startup task: {error}"));
    }
}

pub fn log_startup_environment(log: fn(&str)) {
    let state_dir = runtime_paths::default_state_dir();
    log(&format!(
        "state directory: {}",
        state_dir
            .as_deref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|| "<unavailable>".to_string())
    ));
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, time::Instant};

    use super::*;

    fn ignore(_: &str) {}

    #[test]
    fn missing_packaged_binary_shows_dialog_then_presents_ui() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let supervisor = BackendSupervisor::default();
        let steps = RefCell::new(Vec::new());

        let outcome = run_startup_sequence(
            || {
                launch_backend(
                    &supervisor,
                    RuntimeEnvironment::Packaged,
                    Ok(temp.path().to_path_buf()),
                    ignore,
                )
            },
            |message| steps.borrow_mut().push(format!("dialog: {message}")),
            Duration::ZERO,
            || steps.borrow_mut().push("present".to_string()),
        );

        assert!(matches!(outcome, BackendStartOutcome::BinaryMissing(ref path) if path.starts_with(temp.path())));
        assert_eq!(
            steps.into_inner(),
            vec!["dialog: Backend binary not found!", "present"]
        );
        assert!(!supervisor.is_running());
    }

    #[test]
    fn unavailable_resource_dir_is_logged_without_dialog() {
        let supervisor = BackendSupervisor::default();
        let steps = RefCell::new(Vec::new());

        let outcome = run_startup_sequence(
            || {
                launch_backend(
                    &supervisor,
                    RuntimeEnvironment::Packaged,
                    Err("no resource dir".to_string()),
                    ignore,
                )
            },
            |message| steps.borrow_mut().push(format!("dialog: {message}")),
            Duration::ZERO,
            || steps.borrow_mut().push("present".to_string()),
        );

        assert!(matches!(outcome, BackendStartOutcome::Failed(ref reason) if reason.contains("no resource dir")));
        assert_eq!(steps.into_inner(), vec!["present"]);
    }

    #[test]
    fn ui_is_presented_after_startup_delay() {
        let started = Instant::now();
        let presented_after = RefCell::new(None);

        run_startup_sequence(
            || BackendStartOutcome::Started,
            |_| panic!("no dialog expected"),
            Duration::from_millis(100),
            || *presented_after.borrow_mut() = Some(started.elapsed()),
        );

        let elapsed = presented_after.into_inner().expect("ui presented");
        assert!(elapsed >= Duration::from_millis(100));
    }

    #[cfg(unix)]
    #[test]
    fn packaged_binary_is_spawned_from_resource_dir() {
        use std::{fs, os::unix::fs::PermissionsExt};

        let temp = tempfile::tempdir().expect("create temp dir");
        let binary = temp.path().join("backend_server");
        fs::write(&binary, "#!/bin/sh\nsleep 30\n").expect("write backend stub");
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).expect("chmod");
        let supervisor = BackendSupervisor::default();

        let outcome = launch_backend(
            &supervisor,
            RuntimeEnvironment::Packaged,
            Ok(temp.path().to_path_buf()),
            ignore,
        );

        assert_eq!(outcome, BackendStartOutcome::Started);
        assert!(supervisor.is_running());
        supervisor.stop(ignore);
        assert!(!supervisor.is_running());
    }
}
