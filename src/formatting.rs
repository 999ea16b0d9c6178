//! Display formatting for amounts, addresses, dates and file sizes.
//!
//! Numbers are rendered the way the `en-US` locale does: comma thousands
//! separators and a dot as decimal separator.

use crate::constants::STROOPS_PER_XLM;
use chrono::{Local, TimeZone};

const INVALID_DATE: &str = "Invalid Date";

/// A value that can be rendered as a display amount.
///
/// Text parses like a lenient float parse: the longest numeric prefix is
/// used and anything without one becomes NaN.
pub trait Amount {
    fn to_f64(&self) -> f64;
}

impl Amount for f64 {
    fn to_f64(&self) -> f64 {
        *self
    }
}

impl Amount for u32 {
    fn to_f64(&self) -> f64 {
        f64::from(*self)
    }
}

impl Amount for u64 {
    fn to_f64(&self) -> f64 {
        *self as f64
    }
}

impl Amount for i64 {
    fn to_f64(&self) -> f64 {
        *self as f64
    }
}

impl Amount for i128 {
    fn to_f64(&self) -> f64 {
        *self as f64
    }
}

impl Amount for &str {
    fn to_f64(&self) -> f64 {
        parse_amount(self)
    }
}

impl Amount for String {
    fn to_f64(&self) -> f64 {
        parse_amount(self)
    }
}

/// Formats an XLM amount with between 2 and 7 fraction digits.
pub fn format_xlm(amount: impl Amount) -> String {
    format_decimal(amount.to_f64(), 2, 7)
}

/// Formats a number with thousands separators.
pub fn format_number(value: impl Amount) -> String {
    format_decimal(value.to_f64(), 0, 3)
}

/// Shortens an address to its first 6 and last 4 characters.
pub fn truncate_address(address: &str) -> String {
    truncate_address_with(address, 6, 4)
}

/// Shortens an address to `start_chars` leading and `end_chars` trailing
/// characters joined by an ellipsis. Addresses that already fit are returned
/// unchanged.
pub fn truncate_address_with(address: &str, start_chars: usize, end_chars: usize) -> String {
    let len = address.chars().count();
    if len <= start_chars.saturating_add(end_chars) {
        return address.to_string();
    }
    let head: String = address.chars().take(start_chars).collect();
    let tail: String = address.chars().skip(len - end_chars).collect();
    format!("{head}...{tail}")
}

/// Formats a unix timestamp in milliseconds as a local date, e.g. `Jan 15, 2024, 10:30 AM`.
pub fn format_date(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map_or_else(|| INVALID_DATE.to_string(), |date| date.format("%b %-d, %Y, %I:%M %p").to_string())
}

/// Formats how long ago `timestamp_ms` was, relative to `now_ms`.
pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let seconds = now_ms.saturating_sub(timestamp_ms).div_euclid(1000);
    let minutes = seconds.div_euclid(60);
    let hours = minutes.div_euclid(60);
    let days = hours.div_euclid(24);

    if days > 0 {
        return format!("{days} {} ago", pluralize("day", days));
    }
    if hours > 0 {
        return format!("{hours} {} ago", pluralize("hour", hours));
    }
    if minutes > 0 {
        return format!("{minutes} {} ago", pluralize("minute", minutes));
    }
    "Just now".to_string()
}

/// [`format_relative_time`] against the current wall clock.
pub fn format_relative_time_now(timestamp_ms: i64) -> String {
    format_relative_time(timestamp_ms, chrono::Utc::now().timestamp_millis())
}

/// Converts stroops to XLM.
pub fn stroops_to_xlm(stroops: i128) -> f64 {
    stroops as f64 / STROOPS_PER_XLM as f64
}

/// Converts XLM to stroops, dropping any fraction of a stroop.
///
/// Values outside the `i128` range saturate and NaN maps to zero.
pub fn xlm_to_stroops(xlm: f64) -> i128 {
    (xlm * STROOPS_PER_XLM as f64).trunc() as i128
}

/// Formats a byte count as `B`, `KB` or `MB`.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes < KB {
        return format!("{bytes} B");
    }
    if bytes < MB {
        return format!("{:.2} KB", bytes as f64 / KB as f64);
    }
    format!("{:.2} MB", bytes as f64 / MB as f64)
}

/// Parses the leading float of `input`, NaN if there is none.
pub fn parse_amount(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

/// Parses the leading integer of `input`, `None` if there is none.
pub fn parse_stroops(input: &str) -> Option<i128> {
    let s = input.trim_start();
    let sign = usize::from(matches!(s.as_bytes().first(), Some(b'+' | b'-')));
    let digits = count_digits(&s.as_bytes()[sign..]);
    if digits == 0 {
        return None;
    }
    s[..sign + digits].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn pluralize(unit: &str, count: i64) -> String {
    if count > 1 {
        format!("{unit}s")
    } else {
        unit.to_string()
    }
}

fn format_decimal(value: f64, min_fraction_digits: usize, max_fraction_digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    // Shortest round-trip digits, rounded half away from zero like `Intl.NumberFormat`.
    let shortest = value.abs().to_string();
    let (int_part, frac_part) = round_half_away(&shortest, max_fraction_digits);

    let mut fraction = frac_part.trim_end_matches('0').to_string();
    while fraction.len() < min_fraction_digits {
        fraction.push('0');
    }

    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3 + fraction.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(&int_part));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(&fraction);
    }
    out
}

/// Cuts the plain decimal `digits` to `max_fraction_digits`, carrying into
/// the integer part when the first dropped digit is 5 or more.
fn round_half_away(digits: &str, max_fraction_digits: usize) -> (String, String) {
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if frac_part.len() <= max_fraction_digits {
        return (int_part.to_string(), frac_part.to_string());
    }

    let mut kept: Vec<u8> = int_part.bytes().chain(frac_part.bytes().take(max_fraction_digits)).collect();
    if frac_part.as_bytes()[max_fraction_digits] >= b'5' {
        let mut carry = true;
        for digit in kept.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }

    let (int_digits, frac_digits) = kept.split_at(kept.len() - max_fraction_digits);
    (String::from_utf8_lossy(int_digits).into_owned(), String::from_utf8_lossy(frac_digits).into_owned())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
