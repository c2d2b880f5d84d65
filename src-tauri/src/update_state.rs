use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateState {
    #[default]
    Idle,
    Checking,
    NoUpdate,
    UpdateAvailable,
    Downloading,
    Downloaded,
    /// Downloaded, restart postponed; installed when the app quits.
    PendingInstall,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateEvent {
    CheckStarted,
    NoUpdate,
    UpdateFound,
    Declined,
    DownloadStarted,
    DownloadFinished,
    Error,
}

impl UpdateState {
    /// Transition table for the update lifecycle. Unexpected events leave the state unchanged.
    pub fn on(self, event: UpdateEvent) -> Self {
        use UpdateEvent as E;
        use UpdateState as S;

        match (self, event) {
            (S::Checking | S::Downloading | S::PendingInstall, E::CheckStarted) => self,
            (_, E::CheckStarted) => S::Checking,
            (S::Checking, E::NoUpdate) => S::NoUpdate,
            (S::Checking, E::UpdateFound) => S::UpdateAvailable,
            (S::UpdateAvailable, E::Declined) => S::Idle,
            (S::Downloaded, E::Declined) => S::PendingInstall,
            (S::UpdateAvailable, E::DownloadStarted) => S::Downloading,
            (S::Downloading, E::DownloadFinished) => S::Downloaded,
            (
                S::Checking | S::UpdateAvailable | S::Downloading | S::Downloaded | S::PendingInstall,
                E::Error,
            ) => S::Failed,
            _ => self,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::NoUpdate => "no-update",
            Self::UpdateAvailable => "update-available",
            Self::Downloading => "downloading",
            Self::Downloaded => "downloaded",
            Self::PendingInstall => "pending-install",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub percent: Option<f64>,
    pub bytes_per_second: u64,
    pub downloaded: u64,
    pub total: Option<u64>,
}

/// Accumulates updater chunk callbacks into progress reports.
#[derive(Debug, Default)]
pub struct DownloadProgress {
    downloaded: u64,
}

impl DownloadProgress {
    pub fn record(&mut self, chunk_length: usize, total: Option<u64>, elapsed: Duration) -> ProgressReport {
        self.downloaded += chunk_length as u64;
        let percent = total
            .filter(|total| *total > 0)
            .map(|total| ((self.downloaded as f64 / total as f64) * 100.0).min(100.0));
        let seconds = elapsed.as_secs_f64();
        let bytes_per_second = if seconds > 0.0 {
            (self.downloaded as f64 / seconds) as u64
        } else {
            0
        };

        ProgressReport {
            percent,
            bytes_per_second,
            downloaded: self.downloaded,
            total,
        }
    }
}
