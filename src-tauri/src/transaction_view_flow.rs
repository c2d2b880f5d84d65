use std::{
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use tauri::{AppHandle, Emitter, Manager};

use crate::{
    append_desktop_log, backend_status::validate_threshold, preferences::PreferenceStore,
    transaction_format::format_clock, transaction_render::render_snapshot, AppContext,
    BackendClient, CardClickTarget, FetchOutcome, TransactionView, ViewSnapshot,
    COPY_CONFIRMATION_DURATION, MAIN_WINDOW_LABEL, MANUAL_REFRESH_SETTLE_DELAY,
    TRANSACTION_POLL_INTERVAL, VIEW_RENDERED_EVENT,
};

const INVALID_THRESHOLD_MESSAGE: &str = "Invalid amount: must be a positive number";

/// Runs view operations against the backend. Intermediate states are rendered and
/// passed to `emit`; the final snapshot is returned to the caller.
pub struct ViewDriver<'a, E> {
    client: &'a BackendClient,
    view: &'a Mutex<TransactionView>,
    preferences: &'a PreferenceStore,
    settle_delay: Duration,
    emit: E,
}

impl<'a, E> ViewDriver<'a, E>
where
    E: Fn(&ViewSnapshot),
{
    pub fn new(
        client: &'a BackendClient,
        view: &'a Mutex<TransactionView>,
        preferences: &'a PreferenceStore,
        emit: E,
    ) -> Self {
        Self {
            client,
            view,
            preferences,
            settle_delay: MANUAL_REFRESH_SETTLE_DELAY,
            emit,
        }
    }

    #[cfg(test)]
    fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'a, TransactionView>, String> {
        self.view
            .lock()
            .map_err(|_| "Transaction view lock poisoned.".to_string())
    }

    fn update<T>(
        &self,
        change: impl FnOnce(&mut TransactionView) -> T,
    ) -> Result<(T, ViewSnapshot), String> {
        let mut view = self.lock()?;
        let output = change(&mut view);
        Ok((output, render_snapshot(&view)))
    }

    fn update_and_emit<T>(
        &self,
        change: impl FnOnce(&mut TransactionView) -> T,
    ) -> Result<(T, ViewSnapshot), String> {
        let (output, snapshot) = self.update(change)?;
        (self.emit)(&snapshot);
        Ok((output, snapshot))
    }

    pub fn snapshot(&self) -> Result<ViewSnapshot, String> {
        self.update(|_| ()).map(|(_, snapshot)| snapshot)
    }

    /// One fetch cycle: loading -> rendered | errored. Overlapping cycles are allowed;
    /// a response older than the one already shown is dropped.
    pub async fn load(&self) -> Result<ViewSnapshot, String> {
        let (ticket, _) = self.update_and_emit(TransactionView::begin_fetch)?;

        let result = self.client.fetch_transactions(ticket.limit).await;
        if let Err(error) = &result {
            append_desktop_log(&format!("failed to load transactions: {error}"));
        }
        let status = match self.client.fetch_status().await {
            Ok(status) => Some(status),
            Err(error) => {
                tracing::debug!("backend status unavailable: {error}");
                None
            }
        };

        let (outcome, snapshot) = self.update_and_emit(|view| {
            let outcome = view.apply_fetch(ticket, result, format_clock());
            if outcome == FetchOutcome::Applied {
                view.apply_status(status);
            }
            outcome
        })?;
        if outcome == FetchOutcome::Stale {
            tracing::debug!(
                generation = ticket.generation,
                "discarded stale transaction response"
            );
        }
        Ok(snapshot)
    }

    /// Asks the backend to refresh, waits the settle delay, then re-fetches.
    pub async fn manual_refresh(&self) -> Result<ViewSnapshot, String> {
        self.update_and_emit(|view| view.set_refreshing(true))?;

        if let Err(error) = self.client.trigger_refresh().await {
            append_desktop_log(&format!("failed to trigger backend refresh: {error}"));
        }
        tokio::time::sleep(self.settle_delay).await;

        let loaded = self.load().await;
        let (_, snapshot) = self.update_and_emit(|view| view.set_refreshing(false))?;
        loaded?;
        Ok(snapshot)
    }

    pub async fn set_limit(&self, limit: u32) -> Result<ViewSnapshot, String> {
        let (accepted, _) = self.update(|view| view.set_limit(limit))?;
        if !accepted {
            return Err(format!("Invalid transaction limit: {limit}"));
        }

        if let Err(error) = self.preferences.save_limit(limit) {
            append_desktop_log(&format!("failed to persist transaction limit: {error}"));
        }
        self.load().await
    }

    pub fn toggle_theme(&self) -> Result<ViewSnapshot, String> {
        let (theme, snapshot) = self.update(TransactionView::toggle_theme)?;
        if let Err(error) = self.preferences.save_theme(theme) {
            append_desktop_log(&format!("failed to persist theme: {error}"));
        }
        Ok(snapshot)
    }

    pub fn click_card(&self, index: usize, target: CardClickTarget) -> Result<ViewSnapshot, String> {
        self.update(|view| view.click_card(index, target))
            .map(|(_, snapshot)| snapshot)
    }

    pub fn mark_copied(&self, tx_hash: &str) -> Result<(Option<u64>, ViewSnapshot), String> {
        self.update(|view| view.mark_copied(tx_hash))
    }

    /// Emits only when the mark was still the one identified by `token`.
    pub fn clear_copied(&self, token: u64) -> Result<(), String> {
        let snapshot = {
            let mut view = self.lock()?;
            if !view.clear_copied(token) {
                return Ok(());
            }
            render_snapshot(&view)
        };
        (self.emit)(&snapshot);
        Ok(())
    }

    pub async fn load_threshold(&self) -> Result<ViewSnapshot, String> {
        match self.client.fetch_threshold().await {
            Ok(threshold) => self
                .update_and_emit(|view| view.apply_threshold(threshold))
                .map(|(_, snapshot)| snapshot),
            Err(error) => {
                append_desktop_log(&format!("failed to load whale threshold: {error}"));
                self.snapshot()
            }
        }
    }

    /// Rejections, local or from the backend, are shown next to the threshold input.
    pub async fn set_threshold(&self, amount: f64) -> Result<ViewSnapshot, String> {
        let Some(amount) = validate_threshold(amount) else {
            return self
                .update_and_emit(|view| view.reject_threshold(INVALID_THRESHOLD_MESSAGE.to_string()))
                .map(|(_, snapshot)| snapshot);
        };

        match self.client.set_threshold(amount).await {
            Ok(stored) => {
                append_desktop_log(&format!("whale threshold set to {stored}"));
                self.update_and_emit(|view| view.apply_threshold(stored))
                    .map(|(_, snapshot)| snapshot)
            }
            Err(error) => {
                append_desktop_log(&format!("failed to set whale threshold: {error}"));
                self.update_and_emit(|view| view.reject_threshold(error.user_message()))
                    .map(|(_, snapshot)| snapshot)
            }
        }
    }
}

fn emit_snapshot(app_handle: &AppHandle, snapshot: &ViewSnapshot) {
    if let Err(error) = app_handle.emit_to(MAIN_WINDOW_LABEL, VIEW_RENDERED_EVENT, snapshot) {
        append_desktop_log(&format!("failed to emit transaction view snapshot: {error}"));
    }
}

fn driver<'a>(
    app_handle: &'a AppHandle,
    context: &'a AppContext,
) -> ViewDriver<'a, impl Fn(&ViewSnapshot) + 'a> {
    ViewDriver::new(
        &context.backend_client,
        &context.view,
        &context.preferences,
        move |snapshot: &ViewSnapshot| emit_snapshot(app_handle, snapshot),
    )
}

pub async fn init(app_handle: &AppHandle) -> Result<ViewSnapshot, String> {
    start_poll_loop(app_handle);
    let context = app_handle.state::<AppContext>();
    let driver = driver(app_handle, &context);
    driver.load_threshold().await?;
    driver.load().await
}

pub async fn load_transactions(app_handle: &AppHandle) -> Result<ViewSnapshot, String> {
    let context = app_handle.state::<AppContext>();
    let driver = driver(app_handle, &context);
    driver.load().await
}

pub fn start_poll_loop(app_handle: &AppHandle) {
    let context = app_handle.state::<AppContext>();
    if !context.claim_poll_loop() {
        return;
    }

    let app_handle = app_handle.clone();
    tauri::async_runtime::spawn(async move {
        let mut interval = tokio::time::interval(TRANSACTION_POLL_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; the initial fetch is issued by the caller.
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(error) = load_transactions(&app_handle).await {
                append_desktop_log(&format!("automatic transaction refresh failed: {error}"));
            }
        }
    });
}

pub async fn manual_refresh(app_handle: &AppHandle) -> Result<ViewSnapshot, String> {
    let context = app_handle.state::<AppContext>();
    let driver = driver(app_handle, &context);
    driver.manual_refresh().await
}

pub async fn set_limit(app_handle: &AppHandle, limit: u32) -> Result<ViewSnapshot, String> {
    let context = app_handle.state::<AppContext>();
    let driver = driver(app_handle, &context);
    driver.set_limit(limit).await
}

pub async fn set_threshold(app_handle: &AppHandle, amount: f64) -> Result<ViewSnapshot, String> {
    let context = app_handle.state::<AppContext>();
    let driver = driver(app_handle, &context);
    driver.set_threshold(amount).await
}

pub fn toggle_theme(app_handle: &AppHandle) -> Result<ViewSnapshot, String> {
    let context = app_handle.state::<AppContext>();
    let driver = driver(app_handle, &context);
    driver.toggle_theme()
}

pub fn click_card(
    app_handle: &AppHandle,
    index: usize,
    target: CardClickTarget,
) -> Result<ViewSnapshot, String> {
    let context = app_handle.state::<AppContext>();
    let driver = driver(app_handle, &context);
    driver.click_card(index, target)
}

/// Shows the copy confirmation on the card for `tx_hash` and schedules its removal.
pub fn mark_copied(app_handle: &AppHandle, tx_hash: &str) -> Result<ViewSnapshot, String> {
    let context = app_handle.state::<AppContext>();
    let (token, snapshot) = driver(app_handle, &context).mark_copied(tx_hash)?;

    if let Some(token) = token {
        let app_handle = app_handle.clone();
        tauri::async_runtime::spawn(async move {
            tokio::time::sleep(COPY_CONFIRMATION_DURATION).await;
            let context = app_handle.state::<AppContext>();
            let driver = driver(&app_handle, &context);
            if let Err(error) = driver.clear_copied(token) {
                append_desktop_log(&error);
            }
        });
    }
    Ok(snapshot)
}
