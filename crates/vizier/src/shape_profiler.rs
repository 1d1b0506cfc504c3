// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Profiles an executed result set into the column-type/cardinality shape
//! the auto-detection rules run on. The profile is derived from the rows
//! the database actually returned, never from the schema.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Column-name markers that flag a date-like column regardless of value
/// content.
const DATE_NAME_MARKERS: &[&str] = &["date", "дата", "время", "time"];

/// Textual date shapes accepted when deciding by value instead of name.
const DATE_VALUE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultShape {
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub date_columns: Vec<String>,
    pub row_count: usize,
    pub distinct_counts: HashMap<String, usize>,
}

impl ResultShape {
    pub fn column_count(&self) -> usize {
        self.numeric_columns.len() + self.categorical_columns.len()
    }

    pub fn distinct_count(&self, column: &str) -> Option<usize> {
        self.distinct_counts.get(column).copied()
    }
}

pub struct ShapeProfiler;

impl ShapeProfiler {
    pub fn new() -> Self {
        Self
    }

    /// Derives the shape of one result set. Columns split into numeric and
    /// categorical (a date column stored as text is categorical too, and
    /// additionally listed as a date column).
    pub fn profile(&self, columns: &[String], rows: &[Vec<Value>]) -> ResultShape {
        let mut shape = ResultShape {
            row_count: rows.len(),
            ..ResultShape::default()
        };
        for (index, name) in columns.iter().enumerate() {
            let values: Vec<&Value> = rows.iter().filter_map(|row| row.get(index)).collect();
            if is_numeric_column(&values) {
                shape.numeric_columns.push(name.clone());
            } else {
                shape.categorical_columns.push(name.clone());
            }
            if is_date_column(name, &values) {
                shape.date_columns.push(name.clone());
            }
            let distinct = values
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| v.to_string())
                .unique()
                .count();
            shape.distinct_counts.insert(name.clone(), distinct);
        }
        shape
    }
}

impl Default for ShapeProfiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric means every non-null value is a number, with at least one
/// non-null value present.
fn is_numeric_column(values: &[&Value]) -> bool {
    let mut seen = false;
    for value in values {
        match value {
            Value::Null => {}
            Value::Number(_) => seen = true,
            _ => return false,
        }
    }
    seen
}

/// A column is date-like when its name carries a date marker, or — for
/// name-inconclusive columns — when every non-null value parses as one of
/// the recognised textual date shapes.
fn is_date_column(name: &str, values: &[&Value]) -> bool {
    let name_lower = name.to_lowercase();
    if DATE_NAME_MARKERS
        .iter()
        .any(|marker| name_lower.contains(marker))
    {
        return true;
    }
    let mut seen = false;
    for value in values {
        match value {
            Value::Null => {}
            Value::String(s) => {
                if !DATE_VALUE_FORMATS
                    .iter()
                    .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
                {
                    return false;
                }
                seen = true;
            }
            _ => return false,
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn splits_numeric_and_categorical_columns() {
        let shape = ShapeProfiler::new().profile(
            &columns(&["department", "total_revenue"]),
            &[
                vec![json!("Логистика"), json!(120_000)],
                vec![json!("Безопасность"), json!(90_500.5)],
            ],
        );
        assert_eq!(shape.numeric_columns, vec!["total_revenue"]);
        assert_eq!(shape.categorical_columns, vec!["department"]);
        assert_eq!(shape.row_count, 2);
        assert_eq!(shape.distinct_count("department"), Some(2));
    }

    #[test]
    fn date_columns_are_flagged_by_name() {
        let shape = ShapeProfiler::new().profile(
            &columns(&["date", "revenue"]),
            &[vec![json!("2024-03-01"), json!(10)]],
        );
        assert_eq!(shape.date_columns, vec!["date"]);
        // The textual date column is still categorical.
        assert_eq!(shape.categorical_columns, vec!["date"]);
    }

    #[test]
    fn date_columns_are_flagged_by_value_when_names_say_nothing() {
        let shape = ShapeProfiler::new().profile(
            &columns(&["day", "bought"]),
            &[
                vec![json!("2024-03-01"), json!(1)],
                vec![json!("01.04.2024"), json!(2)],
            ],
        );
        assert_eq!(shape.date_columns, vec!["day"]);
    }

    #[test]
    fn nulls_do_not_break_typing() {
        let shape = ShapeProfiler::new().profile(
            &columns(&["value"]),
            &[vec![json!(null)], vec![json!(3)]],
        );
        assert_eq!(shape.numeric_columns, vec!["value"]);
    }

    #[test]
    fn all_null_columns_are_categorical() {
        let shape =
            ShapeProfiler::new().profile(&columns(&["value"]), &[vec![json!(null)]]);
        assert_eq!(shape.categorical_columns, vec!["value"]);
        assert_eq!(shape.distinct_count("value"), Some(0));
    }
}
