use std::fmt::Write as _;

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::{
    backend_status::BackendStatus,
    transaction_format::{
        escape_html, format_amount, format_date_in, market_url, shorten_address, shorten_hash,
        side_class, side_label,
    },
    Transaction, TransactionView, ViewPhase,
};

const EMPTY_PLACEHOLDER_HTML: &str = concat!(
    r#"<p class="empty-icon">🐋</p>"#,
    r#"<p class="empty-text">No whale transactions yet</p>"#,
    r#"<p class="empty-subtext">New trades will appear here automatically</p>"#,
);

const ERROR_PLACEHOLDER_HTML: &str = concat!(
    r#"<p class="empty-icon">⚠️</p>"#,
    r#"<p class="empty-text">Failed to load transactions</p>"#,
    r#"<p class="empty-subtext">Make sure the backend server is running</p>"#,
);

/// Everything the document needs to paint the surface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub phase: ViewPhase,
    pub theme: &'static str,
    pub theme_class: Option<&'static str>,
    pub theme_icon: &'static str,
    pub limit: u32,
    pub show_loading: bool,
    pub show_list: bool,
    pub show_placeholder: bool,
    pub placeholder_html: &'static str,
    pub card_count: usize,
    pub list_html: String,
    pub last_updated: Option<String>,
    pub refreshing: bool,
    pub refresh_label: &'static str,
    pub status_text: Option<String>,
    pub threshold: Option<f64>,
    pub threshold_label: Option<String>,
    pub threshold_error: Option<String>,
}

pub fn render_snapshot(view: &TransactionView) -> ViewSnapshot {
    render_snapshot_in(view, &Local)
}

pub fn render_snapshot_in<Tz>(view: &TransactionView, tz: &Tz) -> ViewSnapshot
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let preferences = view.preferences();
    let show_list = view.shows_cards();
    let (show_placeholder, placeholder_html) = if view.shows_error() {
        (true, ERROR_PLACEHOLDER_HTML)
    } else if view.shows_empty_state() {
        (true, EMPTY_PLACEHOLDER_HTML)
    } else {
        (false, "")
    };

    let mut list_html = String::new();
    let mut card_count = 0;
    if show_list {
        for (index, transaction) in view.transactions().iter().enumerate() {
            render_card(
                &mut list_html,
                index,
                transaction,
                view.expanded() == Some(index),
                view.copied_index() == Some(index),
                tz,
            );
            card_count += 1;
        }
    }

    // The spinner only replaces the list before anything has been shown.
    let show_loading = view.phase() == ViewPhase::Loading && !show_list && !show_placeholder;

    ViewSnapshot {
        phase: view.phase(),
        theme: preferences.theme.as_str(),
        theme_class: preferences.theme.body_class(),
        theme_icon: preferences.theme.icon(),
        limit: preferences.limit,
        show_loading,
        show_list,
        show_placeholder,
        placeholder_html,
        card_count,
        list_html,
        last_updated: view.last_updated().map(str::to_string),
        refreshing: view.is_refreshing(),
        refresh_label: if view.is_refreshing() {
            "⏳ Refreshing..."
        } else {
            "🔄 Refresh"
        },
        status_text: view.status().map(|status| status_line(status, tz)),
        threshold: view.threshold(),
        threshold_label: view.threshold().map(format_amount),
        threshold_error: view.threshold_error().map(str::to_string),
    }
}

/// `Total: N whale transactions`, followed by the collector's last fetch time when known.
fn status_line<Tz>(status: &BackendStatus, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let total = format!("Total: {} whale transactions", status.total_trades);
    match status.last_fetch.filter(|seconds| *seconds > 0.0) {
        Some(seconds) => format!(
            "{total} | Last updated: {}",
            format_date_in(Some(seconds), tz)
        ),
        None => total,
    }
}

fn render_card<Tz>(
    out: &mut String,
    index: usize,
    transaction: &Transaction,
    expanded: bool,
    copied: bool,
    tz: &Tz,
) where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let side = transaction.side.as_deref();
    let market_link = market_url(transaction.market_id.as_deref());
    let market_button = match &market_link {
        Some(url) => format!(
            r#"<button class="detail-btn" data-action="open-market" data-url="{}">View on Polymarket</button>"#,
            escape_html(url)
        ),
        None => r#"<button class="detail-btn" data-action="open-market" disabled>View on Polymarket</button>"#
            .to_string(),
    };
    let copy_button = if copied {
        r#"<button class="detail-btn copied" data-action="copy-hash">✓ Copied!</button>"#
    } else {
        r#"<button class="detail-btn" data-action="copy-hash">Copy TX Hash</button>"#
    };

    let _ = write!(
        out,
        concat!(
            r#"<div class="transaction-card{expanded}" data-index="{index}" data-tx-hash="{hash}">"#,
            r#"<div class="card-header">"#,
            r#"<div class="card-amount"><span class="whale-icon">🐋</span> {amount}</div>"#,
            r#"<div class="card-side {side_class}">{side}</div>"#,
            r#"</div>"#,
            r#"<div class="card-market">{market}</div>"#,
            r#"<div class="card-date">{date}</div>"#,
            r#"<div class="card-details">"#,
            r#"<div class="detail-row"><span class="detail-label">Outcome:</span><span class="detail-value">{outcome}</span></div>"#,
            r#"<div class="detail-row"><span class="detail-label">Trader:</span><span class="detail-value">{trader}</span></div>"#,
            r#"<div class="detail-row"><span class="detail-label">TX Hash:</span><span class="detail-value">{short_hash}</span></div>"#,
            r#"<div class="detail-actions">{copy_button}{market_button}</div>"#,
            r#"</div>"#,
            r#"</div>"#,
        ),
        expanded = if expanded { " expanded" } else { "" },
        index = index,
        hash = escape_html(&transaction.tx_hash),
        amount = format_amount(transaction.amount),
        side_class = side_class(side),
        side = escape_html(side_label(side)),
        market = escape_html(
            transaction
                .market_name
                .as_deref()
                .unwrap_or("Unknown Market")
        ),
        date = format_date_in(transaction.timestamp, tz),
        outcome = escape_html(transaction.outcome.as_deref().unwrap_or("N/A")),
        trader = escape_html(&shorten_address(transaction.trader_address.as_deref())),
        short_hash = escape_html(&shorten_hash(Some(transaction.tx_hash.as_str()))),
        copy_button = copy_button,
        market_button = market_button,
    );
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{CardClickTarget, Preferences};

    fn sample_transaction() -> Transaction {
        Transaction {
            tx_hash: "0xABC123".to_string(),
            amount: 15000.0,
            side: Some("BUY".to_string()),
            market_name: Some("Will X happen?".to_string()),
            market_id: None,
            outcome: None,
            trader_address: None,
            timestamp: Some(1_700_000_000.0),
        }
    }

    fn view_with(transactions: Vec<Transaction>) -> TransactionView {
        let mut view = TransactionView::new(Preferences::default());
        let ticket = view.begin_fetch();
        view.apply_fetch::<String>(ticket, Ok(transactions), "08:15".to_string());
        view
    }

    #[test]
    fn single_record_renders_one_card_with_formatted_fields() {
        let snapshot = render_snapshot_in(&view_with(vec![sample_transaction()]), &Utc);

        assert_eq!(snapshot.card_count, 1);
        assert!(snapshot.show_list);
        assert!(!snapshot.show_placeholder);
        assert_eq!(snapshot.list_html.matches("transaction-card").count(), 1);
        assert!(snapshot.list_html.contains("$15,000"));
        assert!(snapshot.list_html.contains(r#"<div class="card-side side-buy">BUY</div>"#));
        assert!(snapshot.list_html.contains("Will X happen?"));
        assert!(snapshot.list_html.contains("14/11/2023 22:13"));
        assert!(snapshot.list_html.contains(r#"data-tx-hash="0xABC123""#));
        assert!(snapshot.list_html.contains("open-market\" disabled"));
        assert_eq!(snapshot.last_updated.as_deref(), Some("08:15"));
    }

    #[test]
    fn renders_exactly_n_cards() {
        let transactions = vec![sample_transaction(); 4];
        let snapshot = render_snapshot_in(&view_with(transactions), &Utc);
        assert_eq!(snapshot.card_count, 4);
        assert_eq!(
            snapshot.list_html.matches(r#"class="transaction-card"#).count(),
            4
        );
    }

    #[test]
    fn zero_records_show_empty_placeholder() {
        let snapshot = render_snapshot_in(&view_with(Vec::new()), &Utc);
        assert_eq!(snapshot.card_count, 0);
        assert!(!snapshot.show_list);
        assert!(snapshot.show_placeholder);
        assert!(snapshot.placeholder_html.contains("No whale transactions yet"));
    }

    #[test]
    fn failed_fetch_shows_error_placeholder_and_hides_list() {
        let mut view = view_with(vec![sample_transaction()]);
        let ticket = view.begin_fetch();
        view.apply_fetch(ticket, Err("refused"), "08:16".to_string());

        let snapshot = render_snapshot_in(&view, &Utc);
        assert!(!snapshot.show_list);
        assert!(snapshot.show_placeholder);
        assert!(!snapshot.show_loading);
        assert!(snapshot.placeholder_html.contains("Failed to load transactions"));
        assert!(snapshot
            .placeholder_html
            .contains("Make sure the backend server is running"));
    }

    #[test]
    fn first_fetch_shows_loading_indicator() {
        let mut view = TransactionView::new(Preferences::default());
        view.begin_fetch();

        let snapshot = render_snapshot_in(&view, &Utc);
        assert!(snapshot.show_loading);
        assert!(!snapshot.show_list);
        assert!(!snapshot.show_placeholder);
    }

    #[test]
    fn expanded_and_copied_cards_are_marked() {
        let mut first = sample_transaction();
        first.market_id = Some("will-x-happen".to_string());
        let mut second = first.clone();
        second.tx_hash = "0xDEF456".to_string();
        let mut view = view_with(vec![first, second]);
        view.click_card(1, CardClickTarget::Body);
        view.mark_copied("0xDEF456");

        let snapshot = render_snapshot_in(&view, &Utc);
        assert_eq!(snapshot.list_html.matches("transaction-card expanded").count(), 1);
        assert!(snapshot
            .list_html
            .contains(r#"class="transaction-card expanded" data-index="1""#));
        assert_eq!(snapshot.list_html.matches("✓ Copied!").count(), 1);
        assert!(snapshot
            .list_html
            .contains(r#"data-url="https://polymarket.com/event/will-x-happen""#));
    }

    #[test]
    fn status_line_reports_total_and_last_fetch() {
        let mut view = view_with(Vec::new());
        assert_eq!(render_snapshot_in(&view, &Utc).status_text, None);

        view.apply_status(Some(BackendStatus {
            is_running: true,
            last_fetch: Some(1_700_000_000.0),
            total_trades: 42,
            poll_interval: Some(5.0),
        }));
        assert_eq!(
            render_snapshot_in(&view, &Utc).status_text.as_deref(),
            Some("Total: 42 whale transactions | Last updated: 14/11/2023 22:13")
        );

        view.apply_status(Some(BackendStatus::default()));
        assert_eq!(
            render_snapshot_in(&view, &Utc).status_text.as_deref(),
            Some("Total: 0 whale transactions")
        );
    }

    #[test]
    fn threshold_is_rendered_as_currency() {
        let mut view = view_with(Vec::new());
        view.apply_threshold(25_000.0);

        let snapshot = render_snapshot_in(&view, &Utc);
        assert_eq!(snapshot.threshold, Some(25_000.0));
        assert_eq!(snapshot.threshold_label.as_deref(), Some("$25,000"));
        assert_eq!(snapshot.threshold_error, None);
    }

    #[test]
    fn market_name_is_escaped() {
        let mut transaction = sample_transaction();
        transaction.market_name = Some("<script>alert(1)</script>".to_string());
        let snapshot = render_snapshot_in(&view_with(vec![transaction]), &Utc);
        assert!(!snapshot.list_html.contains("<script>"));
        assert!(snapshot.list_html.contains("&lt;script&gt;"));
    }

    #[test]
    fn theme_fields_follow_preferences() {
        let mut view = view_with(Vec::new());
        let dark = render_snapshot_in(&view, &Utc);
        assert_eq!(dark.theme, "dark");
        assert_eq!(dark.theme_class, None);
        assert_eq!(dark.theme_icon, "🌙");

        view.toggle_theme();
        let light = render_snapshot_in(&view, &Utc);
        assert_eq!(light.theme, "light");
        assert_eq!(light.theme_class, Some("light-theme"));
        assert_eq!(light.theme_icon, "☀️");
    }
}
