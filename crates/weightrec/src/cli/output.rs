//! Rendering of entries and trend series for the terminal.

use std::fmt::Write;

use crate::entry::WeightEntry;
use crate::error::Result;
use crate::view::ChartPoint;

use super::OutputFormat;

/// Message shown when there is nothing to render.
pub const NO_ENTRIES: &str = "No entries yet.";

/// Render the entry table.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_entries(entries: &[WeightEntry], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(entries)?);
    }
    if entries.is_empty() {
        return Ok(NO_ENTRIES.to_string());
    }

    let mut out = String::new();
    match format {
        OutputFormat::Plain => {
            for entry in entries {
                let _ = writeln!(
                    out,
                    "{} {} {:.1} {}",
                    entry.id, entry.date, entry.weight, entry.sports_activity
                );
            }
        }
        OutputFormat::Table | OutputFormat::Json => {
            let _ = writeln!(out, "{:<24}  {:<10}  {:>8}  Sport", "ID", "Date", "Weight");
            let _ = writeln!(out, "{}", "-".repeat(53));
            for entry in entries {
                let _ = writeln!(
                    out,
                    "{:<24}  {:<10}  {:>8.1}  {}",
                    entry.id, entry.date, entry.weight, entry.sports_activity
                );
            }
        }
    }
    Ok(out.trim_end().to_string())
}

/// Render a weight series with its rolling average.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_trend(points: &[ChartPoint], window: usize, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(points)?);
    }
    if points.is_empty() {
        return Ok(NO_ENTRIES.to_string());
    }

    let average = |point: &ChartPoint| {
        point
            .rolling_average
            .map_or_else(|| "-".to_string(), |avg| format!("{avg:.2}"))
    };

    let mut out = String::new();
    match format {
        OutputFormat::Plain => {
            for point in points {
                let _ = writeln!(out, "{} {:.1} {}", point.date, point.weight, average(point));
            }
        }
        OutputFormat::Table | OutputFormat::Json => {
            let label = format!("Avg ({window})");
            let _ = writeln!(out, "{:<10}  {:>8}  {label:>9}", "Date", "Weight");
            let _ = writeln!(out, "{}", "-".repeat(31));
            for point in points {
                let _ = writeln!(
                    out,
                    "{:<10}  {:>8.1}  {:>9}",
                    point.date,
                    point.weight,
                    average(point)
                );
            }
        }
    }
    Ok(out.trim_end().to_string())
}
