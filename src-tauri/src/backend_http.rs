use std::time::Duration;

use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    backend_status::{BackendStatus, StatusResponse, ThresholdResponse},
    Transaction, TransactionsResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("backend rejected {url}: {reason}")]
    Rejected { url: String, reason: String },
}

impl FetchError {
    /// Message suitable for showing next to the control that triggered the request.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { reason, .. } => reason.clone(),
            Self::Request { .. } => "Backend server is not reachable".to_string(),
            Self::Decode { .. } => "Backend sent an unexpected response".to_string(),
        }
    }
}

/// Client for the backend's local HTTP API.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http_client: HttpClient,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http_client = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| HttpClient::new());
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    pub fn transactions_url(&self) -> String {
        self.endpoint("transactions")
    }

    pub fn refresh_url(&self) -> String {
        self.endpoint("refresh")
    }

    pub fn status_url(&self) -> String {
        self.endpoint("status")
    }

    pub fn threshold_url(&self) -> String {
        self.endpoint("threshold")
    }

    /// `GET /transactions?limit=N`. The status code is not inspected; the body decides.
    pub async fn fetch_transactions(&self, limit: u32) -> Result<Vec<Transaction>, FetchError> {
        let url = self.transactions_url();
        let request = self.http_client.get(&url).query(&[("limit", limit)]);
        let parsed: TransactionsResponse = send_for_json(&url, request).await?;
        Ok(parsed.into_transactions())
    }

    /// `POST /refresh`. The acknowledgement body is ignored.
    pub async fn trigger_refresh(&self) -> Result<(), FetchError> {
        let url = self.refresh_url();
        self.http_client
            .post(&url)
            .send()
            .await
            .map(|_| ())
            .map_err(|source| FetchError::Request { url, source })
    }

    pub async fn fetch_status(&self) -> Result<BackendStatus, FetchError> {
        let url = self.status_url();
        let parsed: StatusResponse = send_for_json(&url, self.http_client.get(&url)).await?;
        match parsed.status {
            Some(status) if parsed.success => Ok(status),
            _ => Err(FetchError::Rejected {
                url,
                reason: parsed
                    .error
                    .unwrap_or_else(|| "status missing from response".to_string()),
            }),
        }
    }

    pub async fn fetch_threshold(&self) -> Result<f64, FetchError> {
        let url = self.threshold_url();
        let parsed: ThresholdResponse = send_for_json(&url, self.http_client.get(&url)).await?;
        threshold_from(url, parsed)
    }

    /// `POST /threshold` with `{"amount": N}`. Returns the threshold the backend stored.
    pub async fn set_threshold(&self, amount: f64) -> Result<f64, FetchError> {
        let url = self.threshold_url();
        let request = self
            .http_client
            .post(&url)
            .json(&serde_json::json!({ "amount": amount }));
        let parsed: ThresholdResponse = send_for_json(&url, request).await?;
        threshold_from(url, parsed)
    }
}

async fn send_for_json<T>(url: &str, request: RequestBuilder) -> Result<T, FetchError>
where
    T: DeserializeOwned,
{
    let body = request
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?
        .bytes()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}

fn threshold_from(url: String, parsed: ThresholdResponse) -> Result<f64, FetchError> {
    match parsed.threshold {
        Some(threshold) if parsed.success => Ok(threshold),
        _ => Err(FetchError::Rejected {
            url,
            reason: parsed
                .error
                .unwrap_or_else(|| "threshold missing from response".to_string()),
        }),
    }
}
