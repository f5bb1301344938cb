//! Human byte quantities
//!
//! Parses and formats sizes like `50G`, `512MiB` or `16.7G`. Units are binary
//! multiples of 1024 and case-insensitive; `G`, `GB` and `GiB` all mean 2^30.

use crate::error::ByteSizeError;

pub const BYTE: u64 = 1;
pub const KIBIBYTE: u64 = 1 << 10;
pub const MEBIBYTE: u64 = 1 << 20;
pub const GIBIBYTE: u64 = 1 << 30;
pub const TEBIBYTE: u64 = 1 << 40;
pub const PEBIBYTE: u64 = 1 << 50;
pub const EXBIBYTE: u64 = 1 << 60;

/// Unit suffixes from largest to smallest, used for formatting
const FORMAT_UNITS: [(u64, &str); 7] = [
    (EXBIBYTE, "E"),
    (PEBIBYTE, "P"),
    (TEBIBYTE, "T"),
    (GIBIBYTE, "G"),
    (MEBIBYTE, "M"),
    (KIBIBYTE, "K"),
    (BYTE, "B"),
];

/// Parse a human byte quantity into a byte count.
///
/// The numeric part may be fractional (`1.5G`); the result is truncated to
/// whole bytes. A unit is always required.
pub fn parse_bytes(input: &str) -> Result<u64, ByteSizeError> {
    let normalized = input.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(ByteSizeError::Empty);
    }

    let Some(unit_start) = normalized.find(|c: char| c.is_ascii_alphabetic()) else {
        return Err(ByteSizeError::MissingUnit(input.to_string()));
    };
    let (number, unit) = normalized.split_at(unit_start);

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| ByteSizeError::InvalidNumber(input.to_string()))?;
    if !value.is_finite() {
        return Err(ByteSizeError::InvalidNumber(input.to_string()));
    }
    if value < 0.0 {
        return Err(ByteSizeError::Negative(input.to_string()));
    }

    let multiplier = match unit.trim() {
        "E" | "EB" | "EIB" => EXBIBYTE,
        "P" | "PB" | "PIB" => PEBIBYTE,
        "T" | "TB" | "TIB" => TEBIBYTE,
        "G" | "GB" | "GIB" => GIBIBYTE,
        "M" | "MB" | "MIB" => MEBIBYTE,
        "K" | "KB" | "KIB" => KIBIBYTE,
        "B" => BYTE,
        _ => return Err(ByteSizeError::UnknownUnit(input.to_string())),
    };

    // Float-to-int casts saturate, so oversized inputs clamp to u64::MAX
    Ok((value * multiplier as f64) as u64)
}

/// Format a byte count using the largest unit it reaches, e.g. `16.7G`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }

    let (divisor, unit) = FORMAT_UNITS
        .iter()
        .copied()
        .find(|(size, _)| bytes >= *size)
        .unwrap_or((BYTE, "B"));

    let value = bytes as f64 / divisor as f64;
    let rendered = format!("{value:.1}");
    let rendered = rendered.strip_suffix(".0").unwrap_or(&rendered);
    format!("{rendered}{unit}")
}
