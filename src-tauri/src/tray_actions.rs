pub const TRAY_MENU_SHOW_APP: &str = "tray_show_app";
pub const TRAY_MENU_REFRESH_NOW: &str = "tray_refresh_now";
pub const TRAY_MENU_QUIT: &str = "tray_quit";

pub const TRAY_LABEL_SHOW_APP: &str = "Show App";
pub const TRAY_LABEL_REFRESH_NOW: &str = "Refresh Now";
pub const TRAY_LABEL_QUIT: &str = "Quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayMenuAction {
    ShowApp,
    RefreshNow,
    Quit,
}

/// Dispatch table from menu item id to action.
const TRAY_MENU_TABLE: [(&str, TrayMenuAction); 3] = [
    (TRAY_MENU_SHOW_APP, TrayMenuAction::ShowApp),
    (TRAY_MENU_REFRESH_NOW, TrayMenuAction::RefreshNow),
    (TRAY_MENU_QUIT, TrayMenuAction::Quit),
];

pub fn action_from_menu_id(menu_id: &str) -> Option<TrayMenuAction> {
    TRAY_MENU_TABLE
        .iter()
        .find(|(id, _)| *id == menu_id)
        .map(|(_, action)| *action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_from_menu_id_maps_all_known_actions() {
        assert_eq!(
            action_from_menu_id(TRAY_MENU_SHOW_APP),
            Some(TrayMenuAction::ShowApp)
        );
        assert_eq!(
            action_from_menu_id(TRAY_MENU_REFRESH_NOW),
            Some(TrayMenuAction::RefreshNow)
        );
        assert_eq!(
            action_from_menu_id(TRAY_MENU_QUIT),
            Some(TrayMenuAction::Quit)
        );
    }

    #[test]
    fn action_from_menu_id_returns_none_for_unknown_menu_id() {
        assert_eq!(action_from_menu_id("unknown-menu"), None);
    }

    #[test]
    fn menu_ids_are_unique() {
        for (index, (id, _)) in TRAY_MENU_TABLE.iter().enumerate() {
            assert!(TRAY_MENU_TABLE[index + 1..]
                .iter()
                .all(|(other, _)| other != id));
        }
    }
}
