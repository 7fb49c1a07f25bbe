use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Format a monetary amount in Swedish display style: space-separated
/// thousands, comma decimals, always 2 decimals ("1 118,75").
pub fn format_sek(amount: Decimal) -> String {
    let mut value = amount.round_dp(2);
    value.rescale(2);
    let raw = value.to_string();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::new();
    let chars: Vec<char> = int_part.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(*c);
    }

    format!("{sign}{grouped},{frac_part}")
}

/// Amount with currency suffix ("1 118,75 kr").
pub fn format_sek_kr(amount: Decimal) -> String {
    format!("{} kr", format_sek(amount))
}

/// ISO-style date as shown on invoices ("2024-06-15").
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.date_naive().format("%Y-%m-%d").to_string()
}

/// Escape text for inclusion in HTML markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
