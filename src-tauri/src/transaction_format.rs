use chrono::{Local, TimeZone};
use url::Url;

const POLYMARKET_EVENT_BASE: &str = "https://polymarket.com/event";
const MISSING_VALUE: &str = "N/A";

/// USD with thousands separators and no fractional digits: `15000.4` -> `$15,000`.
pub fn format_amount(amount: f64) -> String {
    if amount.is_nan() {
        return "$NaN".to_string();
    }
    if amount.is_infinite() {
        return if amount > 0.0 { "$∞" } else { "-$∞" }.to_string();
    }

    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// `dd/mm/yyyy HH:MM`; missing or zero timestamps render as `Unknown`.
pub fn format_date_in<Tz>(timestamp: Option<f64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let Some(seconds) = timestamp.filter(|value| value.is_finite() && *value != 0.0) else {
        return "Unknown".to_string();
    };

    match tz.timestamp_opt(seconds.floor() as i64, 0).single() {
        Some(date) => date.format("%d/%m/%Y %H:%M").to_string(),
        None => "Unknown".to_string(),
    }
}

pub fn format_clock() -> String {
    Local::now().format("%H:%M").to_string()
}

fn shorten(value: Option<&str>, head: usize, tail: usize) -> String {
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return MISSING_VALUE.to_string();
    };

    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 20 {
        return value.to_string();
    }

    let head: String = chars[..head].iter().collect();
    let tail: String = chars[chars.len() - tail..].iter().collect();
    format!("{head}...{tail}")
}

pub fn shorten_address(address: Option<&str>) -> String {
    shorten(address, 8, 6)
}

pub fn shorten_hash(hash: Option<&str>) -> String {
    shorten(hash, 10, 8)
}

pub fn side_label(side: Option<&str>) -> &str {
    match side {
        Some(side) if !side.is_empty() => side,
        _ => "UNKNOWN",
    }
}

pub fn side_class(side: Option<&str>) -> &'static str {
    if side_label(side).eq_ignore_ascii_case("buy") {
        "side-buy"
    } else {
        "side-sell"
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(character),
        }
    }
    escaped
}

pub fn market_url(market_id: Option<&str>) -> Option<String> {
    let market_id = market_id.map(str::trim).filter(|id| !id.is_empty())?;
    let mut url = Url::parse(POLYMARKET_EVENT_BASE).ok()?;
    url.path_segments_mut().ok()?.push(market_id);
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;

    #[test]
    fn format_amount_groups_thousands_without_fraction() {
        assert_eq!(format_amount(15000.0), "$15,000");
        assert_eq!(format_amount(999.4), "$999");
        assert_eq!(format_amount(1234567.5), "$1,234,568");
        assert_eq!(format_amount(0.0), "$0");
        assert_eq!(format_amount(-2500.0), "-$2,500");
    }

    #[test]
    fn format_date_renders_day_first_in_given_zone() {
        assert_eq!(format_date_in(Some(1_700_000_000.0), &Utc), "14/11/2023 22:13");

        let plus_two = FixedOffset::east_opt(2 * 3600).expect("valid offset");
        assert_eq!(
            format_date_in(Some(1_700_000_000.0), &plus_two),
            "15/11/2023 00:13"
        );
    }

    #[test]
    fn format_date_treats_missing_and_zero_as_unknown() {
        assert_eq!(format_date_in(None, &Utc), "Unknown");
        assert_eq!(format_date_in(Some(0.0), &Utc), "Unknown");
    }

    #[test]
    fn shorten_keeps_short_values_and_trims_long_ones() {
        assert_eq!(shorten_address(None), "N/A");
        assert_eq!(shorten_address(Some("0x1234")), "0x1234");
        assert_eq!(
            shorten_address(Some("0x1234567890abcdef1234567890abcdef12345678")),
            "0x123456...345678"
        );
        assert_eq!(
            shorten_hash(Some("0xabcdef0123456789abcdef0123456789")),
            "0xabcdef01...23456789"
        );
    }

    #[test]
    fn side_class_is_buy_only_for_buy() {
        assert_eq!(side_class(Some("BUY")), "side-buy");
        assert_eq!(side_class(Some("buy")), "side-buy");
        assert_eq!(side_class(Some("SELL")), "side-sell");
        assert_eq!(side_class(None), "side-sell");
        assert_eq!(side_label(None), "UNKNOWN");
    }

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Yes" & 'No'</b>"#),
            "&lt;b&gt;&quot;Yes&quot; &amp; &#39;No&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn market_url_requires_market_id_and_encodes_it() {
        assert_eq!(market_url(None), None);
        assert_eq!(market_url(Some("  ")), None);
        assert_eq!(
            market_url(Some("will-x-happen")).as_deref(),
            Some("https://polymarket.com/event/will-x-happen")
        );
        assert_eq!(
            market_url(Some("a/../b")).as_deref(),
            Some("https://polymarket.com/event/a%2F..%2Fb")
        );
    }
}
