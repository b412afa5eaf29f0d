//! Small text helpers used by the message templates.

use chrono::DateTime;

/// Shorten a hex address to `0xECc0...d82B`. Inputs shorter than ten
/// characters are returned unchanged.
pub fn short_addr(addr: &str) -> String {
    let chars: Vec<char> = addr.chars().collect();
    if chars.len() < 10 {
        return addr.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn parse_secs(ts: &str) -> Option<i64> {
    ts.trim().parse::<i64>().ok()
}

/// Format a unix timestamp (seconds) as e.g. `Tue, 14 Nov 2023 22:13:20 UTC`.
/// Zero or unparsable input yields `N/A`.
pub fn format_timestamp(ts: &str) -> String {
    match parse_secs(ts) {
        Some(0) | None => "N/A".to_string(),
        Some(secs) => match DateTime::from_timestamp(secs, 0) {
            Some(dt) => dt.format("%a, %d %b %Y %H:%M:%S UTC").to_string(),
            None => "N/A".to_string(),
        },
    }
}

/// Describe how far `ts` lies ahead of `now_secs`: `EXPIRED`, `< 1m`,
/// `in 30m`, `in 2h 15m`, `in 1d 3h` (minutes dropped once days appear).
pub fn time_until(ts: &str, now_secs: i64) -> String {
    let Some(target) = parse_secs(ts) else {
        return "N/A".to_string();
    };
    let diff = target.saturating_sub(now_secs);
    if diff <= 0 {
        return "EXPIRED".to_string();
    }

    let days = diff / 86_400;
    let hours = (diff % 86_400) / 3_600;
    let minutes = (diff % 3_600) / 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 && days == 0 {
        parts.push(format!("{}m", minutes));
    }
    if parts.is_empty() {
        "< 1m".to_string()
    } else {
        format!("in {}", parts.join(" "))
    }
}

/// Format a fixed-point integer string with `decimals` implied decimals,
/// thousands separators and `display_decimals` truncated fraction digits.
///
/// `format_units("98500000000", 6, 2) == "98,500.00"`
pub fn format_units(value: &str, decimals: usize, display_decimals: usize) -> String {
    if value.is_empty() || value == "0" {
        return "0".to_string();
    }
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let split = padded.len() - decimals;
    let (int_part, frac_part) = padded.split_at(split);

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut result = grouped;
    if display_decimals > 0 {
        let frac: String = frac_part.chars().take(display_decimals).collect();
        result.push('.');
        result.push_str(&frac);
    }
    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Parts-per-million as a percentage: `10000` -> `1.00%`.
pub fn format_ppm(ppm: u64) -> String {
    format!("{:.2}%", ppm as f64 / 10_000.0)
}

/// Basis points as a percentage: `"100"` -> `1.00%`.
pub fn format_bps(bps: &str) -> String {
    match bps.trim().parse::<i64>() {
        Ok(v) => format!("{:.2}%", v as f64 / 100.0),
        Err(_) => "N/A".to_string(),
    }
}

/// Explorer link for a transaction hash.
pub fn tx_url(explorer_url: &str, tx_hash: &str) -> String {
    format!("{}/tx/{}", explorer_url.trim_end_matches('/'), tx_hash)
}

/// Escape the characters Telegram's HTML parse mode treats specially.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The first `max` characters of `text`.
pub fn clip(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
