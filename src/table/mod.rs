// ABOUTME: Date-indexed table derived from JSON summary records
// ABOUTME: Optional recursive flattening of nested objects into dotted column paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Tabular Adapter
//!
//! [`Table`] reshapes a sequence of endpoint records into rows indexed by
//! each record's date field. With flattening enabled, nested object fields
//! expand recursively into separate columns keyed by dotted paths
//! (`{"a": {"b": 1}}` becomes column `a.b`); array values stay opaque.
//!
//! Records missing their date field, or carrying an unparsable date, are
//! dropped with a warning rather than failing the whole conversion;
//! [`crate::OuraError::Shape`] is reserved for responses whose envelope is
//! structurally wrong.

mod adapter;

pub use adapter::{TableClient, TableClientV2};

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// One table row: the date it is indexed by plus its column values.
///
/// Rows built from a dateless record (user/personal info) carry no index.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    date: Option<NaiveDate>,
    cells: BTreeMap<String, Value>,
}

impl Row {
    /// The date this row is indexed by.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Value of a column, `None` when the record did not carry it.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }
}

/// A row-indexed table derived from a sequence of JSON records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table from endpoint records.
    ///
    /// `date_key` names the field each row is indexed by; the field itself
    /// is consumed by the index and does not appear as a column. `None`
    /// builds an unindexed table (single-record info endpoints). Records
    /// with a missing or unparsable date are dropped with a warning.
    #[must_use]
    pub fn from_records(records: Vec<Value>, date_key: Option<&str>, flatten: bool) -> Self {
        let mut columns = Vec::new();
        let mut rows = Vec::new();

        for record in records {
            let Value::Object(fields) = record else {
                warn!("Dropping non-object record during tabular conversion");
                continue;
            };

            let date = match date_key {
                Some(key) => match fields.get(key).and_then(parse_date) {
                    Some(date) => Some(date),
                    None => {
                        warn!("Dropping record with missing or invalid `{key}` field");
                        continue;
                    }
                },
                None => None,
            };

            let mut cells = BTreeMap::new();
            for (name, value) in &fields {
                if Some(name.as_str()) == date_key {
                    continue;
                }
                if flatten {
                    flatten_into(name, value, &mut cells, &mut columns);
                } else {
                    record_cell(name, value.clone(), &mut cells, &mut columns);
                }
            }

            rows.push(Row { date, cells });
        }

        Self { columns, rows }
    }

    /// Column names in first-seen order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in response order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row indexed by `date`.
    #[must_use]
    pub fn row(&self, date: NaiveDate) -> Option<&Row> {
        self.rows.iter().find(|row| row.date == Some(date))
    }

    /// Restrict the table to the named columns, in the given order.
    /// Names not present in the table are ignored, mirroring the metric
    /// selection of the original API.
    #[must_use]
    pub fn select(&self, columns: &[&str]) -> Self {
        let kept: Vec<String> = columns
            .iter()
            .filter(|name| self.columns.iter().any(|c| c == *name))
            .map(|name| (*name).to_owned())
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| Row {
                date: row.date,
                cells: row
                    .cells
                    .iter()
                    .filter(|(name, _)| kept.iter().any(|k| k == *name))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
            })
            .collect();

        Self {
            columns: kept,
            rows,
        }
    }

    /// Rename every column to `{prefix}:{name}`.
    #[must_use]
    pub fn prefix_columns(&self, prefix: &str) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|name| format!("{prefix}:{name}"))
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| Row {
                date: row.date,
                cells: row
                    .cells
                    .iter()
                    .map(|(name, value)| (format!("{prefix}:{name}"), value.clone()))
                    .collect(),
            })
            .collect();

        Self { columns, rows }
    }

    /// Inner-join two tables on their date index. Rows without a match in
    /// `other` are dropped; matching rows merge their columns.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut columns = self.columns.clone();
        for name in &other.columns {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.clone());
            }
        }

        let rows = self
            .rows
            .iter()
            .filter_map(|row| {
                let date = row.date?;
                let matching = other.row(date)?;
                let mut cells = row.cells.clone();
                cells.extend(
                    matching
                        .cells
                        .iter()
                        .map(|(name, value)| (name.clone(), value.clone())),
                );
                Some(Row {
                    date: Some(date),
                    cells,
                })
            })
            .collect();

        Self { columns, rows }
    }
}

/// Parse a date-like index value: a plain ISO date or an RFC 3339 timestamp
/// truncated to its date.
fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?;
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.date_naive())
}

fn record_cell(
    name: &str,
    value: Value,
    cells: &mut BTreeMap<String, Value>,
    columns: &mut Vec<String>,
) {
    if !columns.iter().any(|c| c == name) {
        columns.push(name.to_owned());
    }
    cells.insert(name.to_owned(), value);
}

/// Recursively expand nested objects into dotted column paths. Arrays and
/// scalars land as-is.
fn flatten_into(
    prefix: &str,
    value: &Value,
    cells: &mut BTreeMap<String, Value>,
    columns: &mut Vec<String>,
) {
    if let Value::Object(nested) = value {
        for (key, nested_value) in nested {
            flatten_into(&format!("{prefix}.{key}"), nested_value, cells, columns);
        }
    } else {
        record_cell(prefix, value.clone(), cells, columns);
    }
}
