use crate::{backend_status::BackendStatus, preferences::Theme, Preferences, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewPhase {
    Idle,
    Loading,
    Rendered,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardClickTarget {
    Body,
    Button,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer response was already applied; this one was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewContent {
    NotLoaded,
    Rendered,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CopiedMarker {
    index: usize,
    token: u64,
}

/// State of the transaction list surface. Every fetch fully replaces the list.
#[derive(Debug)]
pub struct TransactionView {
    preferences: Preferences,
    transactions: Vec<Transaction>,
    content: ViewContent,
    expanded: Option<usize>,
    copied: Option<CopiedMarker>,
    issued_generation: u64,
    applied_generation: u64,
    copy_token: u64,
    refreshing: bool,
    last_updated: Option<String>,
    status: Option<BackendStatus>,
    threshold: Option<f64>,
    threshold_error: Option<String>,
}

impl TransactionView {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            transactions: Vec::new(),
            content: ViewContent::NotLoaded,
            expanded: None,
            copied: None,
            issued_generation: 0,
            applied_generation: 0,
            copy_token: 0,
            refreshing: false,
            last_updated: None,
            status: None,
            threshold: None,
            threshold_error: None,
        }
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    pub fn copied_index(&self) -> Option<usize> {
        self.copied.map(|marker| marker.index)
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    pub fn status(&self) -> Option<&BackendStatus> {
        self.status.as_ref()
    }

    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    pub fn threshold_error(&self) -> Option<&str> {
        self.threshold_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.applied_generation < self.issued_generation
    }

    pub fn phase(&self) -> ViewPhase {
        if self.is_loading() {
            return ViewPhase::Loading;
        }
        match self.content {
            ViewContent::NotLoaded => ViewPhase::Idle,
            ViewContent::Rendered => ViewPhase::Rendered,
            ViewContent::Errored => ViewPhase::Errored,
        }
    }

    pub fn shows_cards(&self) -> bool {
        self.content == ViewContent::Rendered && !self.transactions.is_empty()
    }

    pub fn shows_empty_state(&self) -> bool {
        self.content == ViewContent::Rendered && self.transactions.is_empty()
    }

    pub fn shows_error(&self) -> bool {
        self.content == ViewContent::Errored
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued_generation += 1;
        FetchTicket {
            generation: self.issued_generation,
            limit: self.preferences.limit,
        }
    }

    /// Applies a fetch result unless a response from a later request already landed.
    pub fn apply_fetch<E>(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Transaction>, E>,
        refreshed_at: String,
    ) -> FetchOutcome {
        if ticket.generation <= self.applied_generation {
            return FetchOutcome::Stale;
        }
        self.applied_generation = ticket.generation;
        self.expanded = None;
        self.copied = None;

        match result {
            Ok(transactions) => {
                self.transactions = transactions;
                self.content = ViewContent::Rendered;
                self.last_updated = Some(refreshed_at);
            }
            Err(_) => {
                self.content = ViewContent::Errored;
            }
        }
        FetchOutcome::Applied
    }

    /// Returns true when the expansion state changed.
    pub fn click_card(&mut self, index: usize, target: CardClickTarget) -> bool {
        if target == CardClickTarget::Button || !self.shows_cards() {
            return false;
        }
        if index >= self.transactions.len() {
            return false;
        }

        self.expanded = if self.expanded == Some(index) {
            None
        } else {
            Some(index)
        };
        true
    }

    pub fn set_limit(&mut self, limit: u32) -> bool {
        if limit == 0 {
            return false;
        }
        self.preferences.limit = limit;
        true
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.preferences.theme = self.preferences.theme.toggled();
        self.preferences.theme
    }

    pub fn set_refreshing(&mut self, refreshing: bool) {
        self.refreshing = refreshing;
    }

    /// A failed status fetch hides the status line rather than showing stale counters.
    pub fn apply_status(&mut self, status: Option<BackendStatus>) {
        self.status = status;
    }

    pub fn apply_threshold(&mut self, threshold: f64) {
        self.threshold = Some(threshold);
        self.threshold_error = None;
    }

    pub fn reject_threshold(&mut self, message: String) {
        self.threshold_error = Some(message);
    }

    /// Marks the copy button of the card showing `tx_hash`. The list may have been
    /// replaced since the user clicked, so the card is looked up by hash, not position.
    /// The returned token clears the mark later.
    pub fn mark_copied(&mut self, tx_hash: &str) -> Option<u64> {
        if !self.shows_cards() {
            return None;
        }
        let index = self
            .transactions
            .iter()
            .position(|transaction| transaction.tx_hash == tx_hash)?;
        self.copy_token += 1;
        self.copied = Some(CopiedMarker {
            index,
            token: self.copy_token,
        });
        Some(self.copy_token)
    }

    pub fn clear_copied(&mut self, token: u64) -> bool {
        match self.copied {
            Some(marker) if marker.token == token => {
                self.copied = None;
                true
            }
            _ => false,
        }
    }
}
