use tauri::{
    image::Image,
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle, Manager,
};

use crate::{
    append_desktop_log, runtime_paths, tray_actions, tray_icon_path, tray_menu_handler,
    window_actions, APP_DISPLAY_NAME, TRAY_ID,
};

fn resolve_tray_icon(app_handle: &AppHandle) -> Option<Image<'static>> {
    let resource_dir = runtime_paths::resource_dir(app_handle);
    let candidates =
        tray_icon_path::icon_candidates(resource_dir.as_deref(), &runtime_paths::manifest_dir());
    let Some(path) = tray_icon_path::first_existing_path(&candidates) else {
        append_desktop_log("no tray icon file found; creating tray without icon");
        return None;
    };

    match Image::from_path(path) {
        Ok(image) => {
            append_desktop_log(&format!("using tray icon: {}", path.display()));
            Some(image)
        }
        Err(error) => {
            append_desktop_log(&format!(
                "failed to load tray icon {}: {}; creating tray without icon",
                path.display(),
                error
            ));
            None
        }
    }
}

pub fn setup_tray(app_handle: &AppHandle) -> Result<(), String> {
    let show_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_SHOW_APP,
        tray_actions::TRAY_LABEL_SHOW_APP,
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray show menu item: {error}"))?;
    let refresh_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_REFRESH_NOW,
        tray_actions::TRAY_LABEL_REFRESH_NOW,
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray refresh menu item: {error}"))?;
    let quit_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_QUIT,
        tray_actions::TRAY_LABEL_QUIT,
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray quit menu item: {error}"))?;
    let separator = PredefinedMenuItem::separator(app_handle)
        .map_err(|error| format!("Failed to create tray separator menu item: {error}"))?;

    let menu = Menu::with_items(app_handle, &[&show_item, &refresh_item, &separator, &quit_item])
        .map_err(|error| format!("Failed to build tray menu: {error}"))?;

    let mut tray_builder = TrayIconBuilder::with_id(TRAY_ID)
        .menu(&menu)
        .tooltip(APP_DISPLAY_NAME)
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| {
            tray_menu_handler::handle_tray_menu_event(app, event.id().as_ref())
        })
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                window_actions::show_main_window(tray.app_handle(), append_desktop_log);
            }
        });

    if let Some(icon) = resolve_tray_icon(app_handle) {
        tray_builder = tray_builder.icon(icon);
    }

    tray_builder
        .build(app_handle)
        .map_err(|error| format!("Failed to create tray icon: {error}"))?;
    append_desktop_log("tray icon created");
    Ok(())
}
