#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_runtime;
mod app_types;
mod backend_config;
mod backend_http;
mod backend_process;
mod backend_status;
mod desktop_bridge_commands;
mod exit_events;
mod launch_plan;
mod logging;
mod main_window;
mod preferences;
mod runtime_paths;
mod startup_mode;
mod startup_task;
mod transaction;
mod transaction_format;
mod transaction_render;
mod transaction_view;
mod transaction_view_commands;
mod transaction_view_flow;
mod tray_actions;
mod tray_icon_path;
mod tray_menu_handler;
mod tray_setup;
mod ui_dispatch;
mod update_flow;
mod update_state;
mod window_actions;

pub(crate) use app_constants::*;
pub(crate) use app_types::{AppContext, AtomicFlagGuard, BridgeAck, BridgeResult};
pub(crate) use backend_http::BackendClient;
pub(crate) use backend_process::BackendSupervisor;
pub(crate) use launch_plan::{LaunchError, LaunchPlan};
pub(crate) use logging::{
    append_backend_error_log, append_backend_log, append_desktop_log, append_shutdown_log,
    append_startup_log, append_update_log,
};
pub(crate) use preferences::Preferences;
pub(crate) use startup_mode::RuntimeEnvironment;
pub(crate) use transaction::{Transaction, TransactionsResponse};
pub(crate) use transaction_render::ViewSnapshot;
pub(crate) use transaction_view::{
    CardClickTarget, FetchOutcome, TransactionView, ViewPhase,
};

fn main() {
    app_runtime::run();
}
