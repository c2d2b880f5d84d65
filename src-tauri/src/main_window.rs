use tauri::{window::Color, AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

use crate::{APP_DISPLAY_NAME, MAIN_WINDOW_DOCUMENT, MAIN_WINDOW_LABEL};

const WINDOW_WIDTH: f64 = 450.0;
const WINDOW_HEIGHT: f64 = 700.0;
const WINDOW_MIN_WIDTH: f64 = 400.0;
const WINDOW_MIN_HEIGHT: f64 = 600.0;
const WINDOW_BACKGROUND: Color = Color(0x1a, 0x1a, 0x1a, 0xff);

/// Creates the single main surface, or returns the existing one.
pub fn create_main_window<F>(app_handle: &AppHandle, log: F) -> Result<WebviewWindow, String>
where
    F: Fn(&str),
{
    if let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) {
        log("main window already exists; reusing it");
        return Ok(window);
    }

    let window = WebviewWindowBuilder::new(
        app_handle,
        MAIN_WINDOW_LABEL,
        WebviewUrl::App(MAIN_WINDOW_DOCUMENT.into()),
    )
    .title(APP_DISPLAY_NAME)
    .inner_size(WINDOW_WIDTH, WINDOW_HEIGHT)
    .min_inner_size(WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT)
    .background_color(WINDOW_BACKGROUND)
    .visible(true)
    .build()
    .map_err(|error| format!("Failed to create main window: {error}"))?;
    log("main window created");
    Ok(window)
}

pub fn show_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("show_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.unminimize() {
        log(&format!("failed to unminimize main window: {error}"));
    }
    if let Err(error) = window.show() {
        log(&format!("failed to show main window: {error}"));
    }
    if let Err(error) = window.set_focus() {
        log(&format!("failed to focus main window: {error}"));
    }
}

pub fn hide_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("hide_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.hide() {
        log(&format!("failed to hide main window: {error}"));
    }
}
