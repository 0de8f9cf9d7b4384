//! Output formatting utilities for the CLI.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use serde::Serialize;

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Borderless list table with upper-cased headers.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Key-value lines under a bold title.
pub fn detail(title: &str, fields: &[(&str, String)]) -> String {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + 1;
    let mut lines = vec![style(title).bold().to_string()];
    for (key, value) in fields {
        lines.push(format!("  {:<width$}  {}", format!("{key}:"), value));
    }
    lines.join("\n")
}

/// Status value cell; colored through comfy-table so column widths stay correct.
pub fn status_cell(value: &str) -> Cell {
    let cell = Cell::new(value);
    match value {
        "Y" => cell.fg(Color::Green).add_attribute(Attribute::Bold),
        "YC" => cell.fg(Color::Green),
        "N" => cell.fg(Color::Yellow),
        _ => cell.fg(Color::DarkGrey),
    }
}

pub fn approval_label(approved: bool) -> String {
    if approved {
        style("approved").green().bold().to_string()
    } else {
        style("pending").yellow().to_string()
    }
}

pub fn or_dash(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Truncate a string to a maximum number of characters, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
