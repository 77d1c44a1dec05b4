//! Number and column formatting shared by the CLI report and the TUI

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format a count with thousand separators (e.g., 1234567 -> "1,234,567")
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);

    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in s.bytes().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch as char);
    }

    result
}

/// Format a money amount: grouped integer part, decimals only when present
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = format_number((cents / 100) as usize);
    match cents % 100 {
        0 => format!("{}${}", sign, whole),
        frac => format!("{}${}.{:02}", sign, whole, frac),
    }
}

/// Filled/empty block bar for a percentage (e.g., 50% of width 10 → "█████░░░░░")
pub fn format_percentage_bar(percent: f64, width: usize) -> String {
    let filled = (((percent / 100.0) * width as f64).round() as usize).min(width);
    let empty = width - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Cut to at most `max` terminal cells, marking the cut with an ellipsis.
/// Wide (CJK) characters count as two cells.
pub fn truncate_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }

    // One cell is reserved for the ellipsis
    let budget = max - 1;
    let mut used = 0;
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Left-align in `width` cells, like `{:<width}` but by display width.
/// Longer strings are returned whole.
pub fn pad_width(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}
