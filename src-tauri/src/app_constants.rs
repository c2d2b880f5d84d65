use std::time::Duration;

pub const APP_DISPLAY_NAME: &str = "PolyWhale";
pub const MAIN_WINDOW_LABEL: &str = "main";
pub const MAIN_WINDOW_DOCUMENT: &str = "index.html";
pub const TRAY_ID: &str = "polywhale-tray";

pub const DEFAULT_BACKEND_API_BASE: &str = "http://localhost:5000/api";
pub const BACKEND_API_BASE_ENV: &str = "POLYWHALE_BACKEND_URL";
pub const DESKTOP_MODE_ENV: &str = "POLYWHALE_DESKTOP_MODE";
pub const STATE_DIR_ENV: &str = "POLYWHALE_HOME";

pub const DESKTOP_STATE_FILE: &str = "desktop_state.json";
pub const DESKTOP_LOG_FILE: &str = "desktop.log";
pub const DEFAULT_LOG_FILTER: &str = "polywhale_desktop=info";

pub const TRAY_REFRESH_EVENT: &str = "trigger-refresh";
pub const UPDATE_PROGRESS_EVENT: &str = "update-download-progress";
pub const VIEW_RENDERED_EVENT: &str = "transaction-view-rendered";

pub const STARTUP_WINDOW_DELAY: Duration = Duration::from_secs(2);
pub const FIRST_UPDATE_CHECK_DELAY: Duration = Duration::from_secs(5);
pub const UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(4 * 60 * 60);
pub const TRANSACTION_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const MANUAL_REFRESH_SETTLE_DELAY: Duration = Duration::from_secs(2);
pub const COPY_CONFIRMATION_DURATION: Duration = Duration::from_secs(2);
