use std::process::{Command, Stdio};
use tauri::AppHandle;
use url::Url;

use crate::{append_desktop_log, update_flow, BridgeAck, BridgeResult};

fn parse_openable_url(raw_url: &str) -> Result<Url, String> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err("Missing external URL.".to_string());
    }

    let parsed = Url::parse(trimmed).map_err(|error| format!("Invalid URL: {error}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(format!(
            "Unsupported URL scheme '{scheme}', only http/https are allowed."
        )),
    }
}

#[cfg(target_os = "macos")]
fn open_url_with_system_browser(url: &str) -> Result<(), String> {
    Command::new("open")
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|error| format!("Failed to run 'open': {error}"))
}

#[cfg(target_os = "windows")]
fn open_url_with_system_browser(url: &str) -> Result<(), String> {
    Command::new("rundll32")
        .args(["url.dll,FileProtocolHandler", url])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|error| format!("Failed to run 'rundll32': {error}"))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn open_url_with_system_browser(url: &str) -> Result<(), String> {
    Command::new("xdg-open")
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|error| format!("Failed to run 'xdg-open': {error}"))
}

#[cfg(not(any(target_os = "macos", target_os = "windows", unix)))]
fn open_url_with_system_browser(_url: &str) -> Result<(), String> {
    Err("Opening external URLs is not supported on this platform.".to_string())
}

// The document talks to the backend over HTTP itself; these two only acknowledge.
#[tauri::command]
pub(crate) fn desktop_bridge_get_transactions() -> BridgeAck {
    BridgeAck::ok()
}

#[tauri::command]
pub(crate) fn desktop_bridge_trigger_refresh() -> BridgeAck {
    BridgeAck::ok()
}

#[tauri::command]
pub(crate) fn desktop_bridge_check_for_updates(app_handle: AppHandle) -> BridgeAck {
    tauri::async_runtime::spawn(async move {
        update_flow::check_for_updates(&app_handle).await;
    });
    BridgeAck::ok()
}

#[tauri::command]
pub(crate) fn desktop_bridge_open_external_url(url: String) -> BridgeResult {
    let parsed = match parse_openable_url(&url) {
        Ok(parsed) => parsed,
        Err(error) => {
            append_desktop_log(&format!("refused to open external url: {error}"));
            return BridgeResult {
                ok: false,
                reason: Some(error),
            };
        }
    };

    match open_url_with_system_browser(parsed.as_ref()) {
        Ok(()) => BridgeResult {
            ok: true,
            reason: None,
        },
        Err(error) => {
            append_desktop_log(&error);
            BridgeResult {
                ok: false,
                reason: Some(error),
            }
        }
    }
}
