//! Output formatting utilities

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use rewards_core::ToastKind;
use serde::Serialize;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Print a toast in its kind's colour
pub fn toast(kind: ToastKind, msg: &str) {
    match kind {
        ToastKind::Success => success(&format!("✓ {}", msg)),
        ToastKind::Error => error(&format!("✗ {}", msg)),
        ToastKind::Warning => warning(&format!("! {}", msg)),
        ToastKind::Info => info(msg),
    }
}

/// Dimmed follow-up hint
pub fn hint(msg: &str) {
    println!("{}", msg.dimmed());
}

pub fn heading(title: &str) {
    println!("{}", title.bold());
}

/// Spinner shown while a request is in flight
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format a point amount with thousands separators
pub fn format_points(points: i64) -> String {
    let digits = points.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if points < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Render a backend timestamp as `YYYY-MM-DD HH:MM`
///
/// Values that are not RFC 3339 are shown as received.
pub fn format_created(created_at: Option<&str>) -> String {
    let Some(raw) = created_at else {
        return "-".to_string();
    };
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        })
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(0), "0");
        assert_eq!(format_points(999), "999");
        assert_eq!(format_points(1000), "1,000");
        assert_eq!(format_points(1234567), "1,234,567");
        assert_eq!(format_points(-2500), "-2,500");
    }

    #[test]
    fn test_format_created() {
        assert_eq!(format_created(None), "-");
        assert_eq!(format_created(Some("2024-03-01T09:15:00Z")), "2024-03-01 09:15");
        assert_eq!(format_created(Some("2024-03-01T09:15:42.123456")), "2024-03-01 09:15");
        assert_eq!(format_created(Some("yesterday")), "yesterday");
    }
}
