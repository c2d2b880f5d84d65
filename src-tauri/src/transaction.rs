use serde::Deserialize;

/// A whale trade as served by the backend. Read-only on the shell side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub tx_hash: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub market_name: Option<String>,
    #[serde(default)]
    pub market_id: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub trader_address: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub timestamp: Option<f64>,
}

/// Body of `GET /api/transactions`. Other fields (`success`, `count`) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsResponse {
    #[serde(default)]
    pub transactions: Option<Vec<Transaction>>,
}

impl TransactionsResponse {
    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_without_transactions_is_empty() {
        let parsed: TransactionsResponse =
            serde_json::from_str(r#"{"success": false, "error": "db locked"}"#).expect("parse");
        assert!(parsed.into_transactions().is_empty());

        let parsed: TransactionsResponse =
            serde_json::from_str(r#"{"transactions": null}"#).expect("parse");
        assert!(parsed.into_transactions().is_empty());
    }

    #[test]
    fn transaction_tolerates_missing_optional_fields() {
        let parsed: TransactionsResponse = serde_json::from_str(
            r#"{"transactions": [{"tx_hash": "0xabc", "amount": 15000, "side": "BUY", "extra": 1}]}"#,
        )
        .expect("parse");
        let transactions = parsed.into_transactions();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].tx_hash, "0xabc");
        assert_eq!(transactions[0].amount, 15000.0);
        assert_eq!(transactions[0].side.as_deref(), Some("BUY"));
        assert_eq!(transactions[0].market_name, None);
        assert_eq!(transactions[0].timestamp, None);
    }
}
