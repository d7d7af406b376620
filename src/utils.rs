use crate::error::{IpoReadinessError, Result};
use crate::schema::FiscalSeries;

/// Offset between the Buddhist era and the common era.
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

pub fn be_to_ce(year: i32) -> i32 {
    year - BUDDHIST_ERA_OFFSET
}

pub fn ce_to_be(year: i32) -> i32 {
    year + BUDDHIST_ERA_OFFSET
}

/// Converts a spreadsheet column identifier ("A", "J", "AB") to a
/// zero-based column index.
pub fn column_index(column: &str) -> Result<u32> {
    let trimmed = column.trim();
    if trimmed.is_empty() || trimmed.len() > 3 {
        return Err(IpoReadinessError::InvalidCellReference(format!(
            "Column '{}' must be one to three letters",
            column
        )));
    }

    let mut index: u32 = 0;
    for ch in trimmed.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(IpoReadinessError::InvalidCellReference(format!(
                "Column '{}' contains non-letter character '{}'",
                column, ch
            )));
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as u32;
        index = index * 26 + digit + 1;
    }

    Ok(index - 1)
}

/// Zero-based (row, column) for a 1-based spreadsheet row and a column letter.
pub fn cell_position(row: u32, column: &str) -> Result<(u32, u32)> {
    if row == 0 {
        return Err(IpoReadinessError::InvalidCellReference(format!(
            "Row 0 is not valid for column '{}', rows start at 1",
            column
        )));
    }
    Ok((row - 1, column_index(column)?))
}

/// Value of the most recent year that has one.
pub fn latest_value(series: &FiscalSeries) -> Option<(i32, f64)> {
    series.iter().next_back().map(|(year, value)| (*year, *value))
}

/// Values of the most recent `limit` years that have one, newest first.
pub fn latest_values(series: &FiscalSeries, limit: usize) -> Vec<f64> {
    series.values().rev().take(limit).copied().collect()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats a whole number with comma thousands separators.
pub fn format_grouped(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Formats an amount in baht the way the readiness reports display money:
/// billions and millions with two decimals, smaller amounts grouped.
pub fn format_thb(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000_000.0 {
        format!("{:.2} พันล้านบาท", value / 1_000_000_000.0)
    } else if magnitude >= 1_000_000.0 {
        format!("{:.2} ล้านบาท", value / 1_000_000.0)
    } else {
        format!("{} บาท", format_grouped(value))
    }
}

/// Truncates to at most `max_chars` characters (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
