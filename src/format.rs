// Display formatting helpers
//
// Unit conversion, number abbreviation, ratios, truncation and timestamps.
// Every function is total: text that does not parse as a number is handed
// back unchanged.

use chrono::DateTime;

use crate::constants::SATS_PER_XPI;

pub fn to_xpi_from_sats(sats: i64) -> f64 {
    sats as f64 / SATS_PER_XPI as f64
}

pub fn to_sats_from_xpi(xpi: f64) -> i64 {
    (xpi * SATS_PER_XPI as f64).round() as i64
}

/// Exact decimal rendering of a sats amount, 6 fractional digits.
///
/// # Examples
/// ```
/// use lotusia_explorer::format::format_sats;
/// assert_eq!(format_sats(1_000_000), "1.000000");
/// assert_eq!(format_sats(-500_000), "-0.500000");
/// ```
pub fn format_sats(amount: i64) -> String {
    let abs = amount.unsigned_abs();
    let whole = abs / SATS_PER_XPI;
    let frac = abs % SATS_PER_XPI;
    if amount < 0 {
        format!("-{}.{:06}", whole, frac)
    } else {
        format!("{}.{:06}", whole, frac)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Hashrate,
    Blocksize,
}

impl NumberKind {
    fn unit(&self) -> &'static str {
        match self {
            NumberKind::Hashrate => "H",
            NumberKind::Blocksize => "B",
        }
    }
}

const MAGNITUDES: &[(f64, &str)] = &[
    (1e15, "P"),
    (1e12, "T"),
    (1e9, "G"),
    (1e6, "M"),
    (1e3, "K"),
];

/// `1234567.0` hashes → `"1.2 MH"`
pub fn to_minified_number(kind: NumberKind, value: f64) -> String {
    let unit = kind.unit();
    for (scale, suffix) in MAGNITUDES {
        if value >= *scale {
            return format!("{:.1} {}{}", value / scale, suffix, unit);
        }
    }
    format!("{} {}", value, unit)
}

pub fn to_minified_number_str(kind: NumberKind, value: &str) -> String {
    match parse_number(value) {
        Some(num) => to_minified_number(kind, num),
        None => value.to_string(),
    }
}

pub fn to_minified_time(seconds: f64) -> String {
    if seconds >= 3600.0 {
        format!("{:.1} hours", seconds / 3600.0)
    } else if seconds >= 60.0 {
        format!("{:.1} minutes", seconds / 60.0)
    } else {
        format!("{:.1} seconds", seconds)
    }
}

pub fn to_minified_time_str(seconds: &str) -> String {
    match parse_number(seconds) {
        Some(num) => to_minified_time(num),
        None => seconds.to_string(),
    }
}

/// Abbreviate a sats total after dividing by `divisor` (usually one XPI):
/// `"12.3K"`, `"-4.0M"`.
pub fn to_minified_stat_count(value: i64, divisor: i64) -> String {
    let divisor = if divisor == 0 { 1 } else { divisor };
    let count = (value as f64 / divisor as f64).floor();
    let abs = count.abs();
    if abs >= 1e9 {
        format!("{:.1}B", count / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", count / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", count / 1e3)
    } else {
        format!("{}", count)
    }
}

/// Share of positive votes in percent.
///
/// `(0, 0)` and `(0, n)` are `"0"`, `(p, 0)` is `"100"`, anything else has
/// one decimal.
pub fn percent(positive: i64, negative: i64) -> String {
    match (positive, negative) {
        (0, _) => "0".to_string(),
        (p, 0) if p > 0 => "100".to_string(),
        (p, n) => {
            let total = p as f64 + n as f64;
            if total == 0.0 {
                return "0".to_string();
            }
            format!("{:.1}", p as f64 / total * 100.0)
        }
    }
}

fn head(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn tail(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    match s.char_indices().nth(count - n) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

pub fn truncate_sha256(sha256: &str) -> String {
    format!("{}...{}", head(sha256, 16), tail(sha256, 6))
}

pub fn truncate_txid(txid: &str) -> String {
    truncate_sha256(txid)
}

pub fn truncate_address(address: &str) -> String {
    format!("{}...{}", head(address, 17), tail(address, 6))
}

pub fn truncate_block_hash(hash: &str) -> String {
    format!("{}...{}", head(hash, 1), tail(hash, 16))
}

pub fn truncate_post_id(post_id: &str) -> String {
    if post_id.chars().count() > 8 {
        format!("{}...", head(post_id, 8))
    } else {
        post_id.to_string()
    }
}

/// `1704207845` → `"Jan 2, 2024, 03:04:05 PM UTC"`
pub fn format_timestamp(unix: i64) -> String {
    match DateTime::from_timestamp(unix, 0) {
        Some(dt) => dt.format("%b %-d, %Y, %I:%M:%S %p UTC").to_string(),
        None => unix.to_string(),
    }
}

pub fn num_blocks_from_tip(tip_height: i32, block_height: i32) -> i64 {
    tip_height as i64 - block_height as i64 + 1
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
