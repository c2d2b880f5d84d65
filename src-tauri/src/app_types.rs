use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use tauri_plugin_updater::Update;

use crate::{
    backend_config, preferences::PreferenceStore, update_state::UpdateState, BackendClient,
    BackendSupervisor, RuntimeEnvironment, TransactionView,
};

/// Process-wide shell state, managed by Tauri for the lifetime of the app.
#[derive(Debug)]
pub struct AppContext {
    pub environment: RuntimeEnvironment,
    pub backend: BackendSupervisor,
    pub backend_client: BackendClient,
    pub view: Mutex<TransactionView>,
    pub preferences: PreferenceStore,
    pub update: UpdateCoordinatorState,
    quitting: AtomicBool,
    poll_started: AtomicBool,
}

impl AppContext {
    pub fn new(
        environment: RuntimeEnvironment,
        view: TransactionView,
        preferences: PreferenceStore,
    ) -> Self {
        Self {
            environment,
            backend: BackendSupervisor::default(),
            backend_client: BackendClient::new(backend_config::resolve_backend_api_base()),
            view: Mutex::new(view),
            preferences,
            update: UpdateCoordinatorState::default(),
            quitting: AtomicBool::new(false),
            poll_started: AtomicBool::new(false),
        }
    }

    pub fn mark_quitting(&self) {
        self.quitting.store(true, Ordering::SeqCst);
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::SeqCst)
    }

    /// Returns true exactly once per process.
    pub fn claim_poll_loop(&self) -> bool {
        self.poll_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// A downloaded update whose restart the user postponed.
pub struct PendingUpdate {
    pub update: Update,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for PendingUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingUpdate")
            .field("version", &self.update.version)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct UpdateCoordinatorState {
    pub state: Mutex<UpdateState>,
    pub in_progress: AtomicBool,
    pub pending: Mutex<Option<PendingUpdate>>,
}

impl UpdateCoordinatorState {
    pub fn park_pending(&self, pending: PendingUpdate) -> Result<(), String> {
        let mut slot = self
            .pending
            .lock()
            .map_err(|_| "Pending update lock poisoned.".to_string())?;
        *slot = Some(pending);
        Ok(())
    }

    /// Hands out the postponed update at most once.
    pub fn take_pending(&self) -> Option<PendingUpdate> {
        self.pending.lock().ok()?.take()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct BridgeAck {
    pub success: bool,
}

impl BridgeAck {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct BridgeResult {
    pub ok: bool,
    pub reason: Option<String>,
}

pub struct AtomicFlagGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> AtomicFlagGuard<'a> {
    pub fn try_set(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self { flag })
    }
}

impl Drop for AtomicFlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}
