use serde::Deserialize;

/// Collector status reported by `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct BackendStatus {
    #[serde(default)]
    pub is_running: bool,
    /// Unix seconds of the last successful trade fetch.
    #[serde(default)]
    pub last_fetch: Option<f64>,
    #[serde(default)]
    pub total_trades: u64,
    /// Minutes between collector polls.
    #[serde(default)]
    pub poll_interval: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: Option<BackendStatus>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET /api/threshold` and `POST /api/threshold`.
#[derive(Debug, Default, Deserialize)]
pub struct ThresholdResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Whale threshold in USD. Only finite, strictly positive amounts are accepted.
pub fn validate_threshold(amount: f64) -> Option<f64> {
    (amount.is_finite() && amount > 0.0).then_some(amount)
}
