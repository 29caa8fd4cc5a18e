// ABOUTME: Export writers for tables
// ABOUTME: CSV serialization and fixed-width text rendering
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Export writers for [`Table`] values: CSV for downstream tooling and a
//! fixed-width text rendering for terminal display. The date index is
//! emitted as the first column; nested values are serialized as compact
//! JSON.

use crate::errors::Result;
use crate::table::{Row, Table};
use serde_json::Value;
use std::io::Write;

/// Header used for the date index column.
const INDEX_HEADER: &str = "date";

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn index_text(row: &Row) -> String {
    row.date().map(|date| date.to_string()).unwrap_or_default()
}

/// Write a table as CSV.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.columns().len() + 1);
    header.push(INDEX_HEADER.to_owned());
    header.extend(table.columns().iter().cloned());
    csv_writer.write_record(&header)?;

    for row in table.rows() {
        let mut fields = Vec::with_capacity(header.len());
        fields.push(index_text(row));
        for column in table.columns() {
            fields.push(cell_text(row.get(column)));
        }
        csv_writer.write_record(&fields)?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Serialize a table to a CSV string.
pub fn csv_string(table: &Table) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn center(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.chars().count());
    let left = padding / 2;
    let right = padding - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

/// Render a table as a fixed-width text grid for terminal output.
#[must_use]
pub fn render(table: &Table) -> String {
    let headers: Vec<String> = std::iter::once(INDEX_HEADER.to_owned())
        .chain(table.columns().iter().cloned())
        .collect();

    let body: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            std::iter::once(index_text(row))
                .chain(table.columns().iter().map(|column| cell_text(row.get(column))))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            body.iter()
                .map(|cells| cells[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let separator = {
        let segments: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        format!("+{}+", segments.join("+"))
    };
    let format_line = |cells: &[String]| {
        let segments: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {} ", center(cell, *width)))
            .collect();
        format!("|{}|", segments.join("|"))
    };

    let mut output = String::new();
    output.push_str(&separator);
    output.push('\n');
    output.push_str(&format_line(&headers));
    output.push('\n');
    output.push_str(&separator);
    output.push('\n');
    for cells in &body {
        output.push_str(&format_line(cells));
        output.push('\n');
    }
    output.push_str(&separator);
    output
}
