use std::time::Instant;

use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use tauri_plugin_updater::{Update, UpdaterExt};

use crate::{
    app_types::PendingUpdate,
    append_update_log,
    update_state::{DownloadProgress, UpdateEvent, UpdateState},
    AppContext, AtomicFlagGuard, FIRST_UPDATE_CHECK_DELAY, MAIN_WINDOW_LABEL,
    UPDATE_CHECK_INTERVAL, UPDATE_PROGRESS_EVENT,
};

fn transition(context: &AppContext, event: UpdateEvent) -> UpdateState {
    let Ok(mut state) = context.update.state.lock() else {
        append_update_log("update state lock poisoned; ignoring transition");
        return UpdateState::Failed;
    };
    let previous = *state;
    *state = previous.on(event);
    if previous != *state {
        append_update_log(&format!(
            "update state {} -> {} ({event:?})",
            previous.as_str(),
            state.as_str()
        ));
    }
    *state
}

fn ask_user(app_handle: &AppHandle, title: &str, message: String, accept: &str, decline: &str) -> bool {
    app_handle
        .dialog()
        .message(message)
        .title(title)
        .kind(MessageDialogKind::Info)
        .buttons(MessageDialogButtons::OkCancelCustom(
            accept.to_string(),
            decline.to_string(),
        ))
        .blocking_show()
}

/// First check shortly after startup, then on a fixed interval. No-op outside packaged builds.
pub fn spawn_update_scheduler(app_handle: AppHandle) {
    let packaged = app_handle.state::<AppContext>().environment.is_packaged();
    if !packaged {
        append_update_log("running in development mode, skipping scheduled update checks");
        return;
    }

    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(FIRST_UPDATE_CHECK_DELAY).await;
        let mut interval = tokio::time::interval(UPDATE_CHECK_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            check_for_updates(&app_handle).await;
        }
    });
}

pub async fn check_for_updates(app_handle: &AppHandle) {
    let context = app_handle.state::<AppContext>();
    if !context.environment.is_packaged() {
        append_update_log("running in development mode, skipping update check");
        return;
    }
    let Some(_guard) = AtomicFlagGuard::try_set(&context.update.in_progress) else {
        append_update_log("update check already in progress; skipping");
        return;
    };

    if transition(&context, UpdateEvent::CheckStarted) == UpdateState::PendingInstall {
        append_update_log("a downloaded update is waiting to install on quit; skipping check");
        return;
    }
    let current_version = app_handle.package_info().version.to_string();
    let updater = match app_handle.updater() {
        Ok(updater) => updater,
        Err(error) => {
            append_update_log(&format!("failed to initialize updater: {error}"));
            transition(&context, UpdateEvent::Error);
            return;
        }
    };

    let check_started = Instant::now();
    match updater.check().await {
        Ok(Some(update)) => {
            append_update_log(&format!(
                "update available: current_version={} latest_version={} elapsed_ms={}",
                current_version,
                update.version,
                check_started.elapsed().as_millis()
            ));
            transition(&context, UpdateEvent::UpdateFound);
            offer_update(app_handle, &context, update).await;
        }
        Ok(None) => {
            append_update_log(&format!(
                "no updates available: current_version={} elapsed_ms={}",
                current_version,
                check_started.elapsed().as_millis()
            ));
            transition(&context, UpdateEvent::NoUpdate);
        }
        Err(error) => {
            append_update_log(&format!(
                "update check failed: current_version={current_version} error={error}"
            ));
            transition(&context, UpdateEvent::Error);
        }
    }
}

async fn offer_update(app_handle: &AppHandle, context: &AppContext, update: Update) {
    let new_version = update.version.to_string();
    let accepted = ask_user(
        app_handle,
        "Update Available",
        format!(
            "A new version ({new_version}) is available!\nWould you like to download and install it now?"
        ),
        "Update & Restart",
        "Later",
    );
    if !accepted {
        append_update_log("user postponed the update");
        transition(context, UpdateEvent::Declined);
        return;
    }

    transition(context, UpdateEvent::DownloadStarted);
    let started = Instant::now();
    let mut progress = DownloadProgress::default();
    let progress_handle = app_handle.clone();
    let downloaded = update
        .download(
            move |chunk_length, content_length| {
                let report = progress.record(chunk_length, content_length, started.elapsed());
                tracing::debug!(
                    phase = "update",
                    percent = ?report.percent,
                    bytes_per_second = report.bytes_per_second,
                    "download progress"
                );
                if let Err(error) =
                    progress_handle.emit_to(MAIN_WINDOW_LABEL, UPDATE_PROGRESS_EVENT, report)
                {
                    tracing::debug!(phase = "update", "failed to emit download progress: {error}");
                }
            },
            || append_update_log("update download finished"),
        )
        .await;
    let bytes = match downloaded {
        Ok(bytes) => bytes,
        Err(error) => {
            append_update_log(&format!("failed to download update {new_version}: {error}"));
            transition(context, UpdateEvent::Error);
            return;
        }
    };
    transition(context, UpdateEvent::DownloadFinished);

    let restart_now = ask_user(
        app_handle,
        "Update Ready",
        "Update downloaded successfully!\nThe application will restart to install the update."
            .to_string(),
        "Restart Now",
        "Later",
    );
    if !restart_now {
        append_update_log(&format!(
            "user deferred restart; update {new_version} will install on quit"
        ));
        match context.update.park_pending(PendingUpdate { update, bytes }) {
            Ok(()) => {
                transition(context, UpdateEvent::Declined);
            }
            Err(error) => {
                append_update_log(&error);
                transition(context, UpdateEvent::Error);
            }
        }
        return;
    }

    if let Err(error) = update.install(&bytes) {
        append_update_log(&format!("failed to install update {new_version}: {error}"));
        transition(context, UpdateEvent::Error);
        return;
    }

    append_update_log(&format!("update {new_version} installed; restarting"));
    context.mark_quitting();
    app_handle.request_restart();
}

/// Installs an update whose restart was postponed. Runs once, during process exit,
/// after the backend has been stopped.
pub fn install_pending_update(context: &AppContext) {
    let Some(pending) = context.update.take_pending() else {
        return;
    };
    let version = pending.update.version.clone();
    match pending.update.install(&pending.bytes) {
        Ok(()) => append_update_log(&format!("installed postponed update {version} on quit")),
        Err(error) => {
            append_update_log(&format!(
                "failed to install postponed update {version}: {error}"
            ));
            transition(context, UpdateEvent::Error);
        }
    }
}
