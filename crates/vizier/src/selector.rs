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

//! Phase two of chart selection, and render-plan construction. Shape
//! inference runs only when the query text said nothing; construction
//! degrades along fixed chains down to the guaranteed-renderable table,
//! and to an explicit empty placeholder below that. Nothing here returns
//! an error to the caller.

use crate::category::ChartCategory;
use crate::error::SelectionError;
use crate::shape_profiler::ResultShape;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Distinct-value band in which a single categorical column reads well as
/// a pie chart.
const PIE_MIN_CATEGORIES: usize = 2;
const PIE_MAX_CATEGORIES: usize = 8;

/// Column mappings for one renderable chart. The rendering collaborator
/// turns this into an actual figure; the core only decides what maps
/// where.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderPlan {
    pub category: ChartCategory,
    pub mappings: HashMap<String, String>,
}

/// Either a render plan or the explicit empty placeholder — never an
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderOutcome {
    Plan(RenderPlan),
    Empty { message: String },
}

impl RenderOutcome {
    pub fn category(&self) -> Option<ChartCategory> {
        match self {
            Self::Plan(plan) => Some(plan.category),
            Self::Empty { .. } => None,
        }
    }
}

/// The shape-driven fallback rules, applied in fixed order: temporal
/// series, then a small categorical breakdown, then category/measure
/// pairs, then pure numeric distributions, then a plain table.
pub fn auto_detect(shape: &ResultShape) -> ChartCategory {
    if shape.row_count == 0 {
        return ChartCategory::Table;
    }
    if !shape.date_columns.is_empty() && !shape.numeric_columns.is_empty() {
        return ChartCategory::Line;
    }
    if let Some(first_categorical) = shape.categorical_columns.first() {
        if let Some(distinct) = shape.distinct_count(first_categorical) {
            if (PIE_MIN_CATEGORIES..=PIE_MAX_CATEGORIES).contains(&distinct) {
                return ChartCategory::Pie;
            }
        }
    }
    if !shape.categorical_columns.is_empty() && !shape.numeric_columns.is_empty() {
        return ChartCategory::Bar;
    }
    if !shape.numeric_columns.is_empty() && shape.categorical_columns.is_empty() {
        return ChartCategory::Histogram;
    }
    ChartCategory::Table
}

/// Builds the mappings for the chosen category, walking its degradation
/// chain on structural failure. An empty result set or a column-free one
/// ends in the explicit placeholder.
pub fn build_render_plan(category: ChartCategory, shape: &ResultShape) -> RenderOutcome {
    if shape.row_count == 0 {
        return RenderOutcome::Empty {
            message: "Нет данных для отображения".to_string(),
        };
    }
    let resolved = match category {
        ChartCategory::Auto | ChartCategory::Map => auto_detect(shape),
        other => other,
    };
    for step in degradation_chain(resolved) {
        match try_build(*step, shape) {
            Ok(plan) => {
                if *step != resolved {
                    debug!("Chart '{resolved}' degraded to '{step}'");
                }
                return RenderOutcome::Plan(plan);
            }
            Err(e) => debug!("Cannot build '{step}': {e}"),
        }
    }
    warn!("No renderable encoding for this result set; returning placeholder");
    RenderOutcome::Empty {
        message: "Нет данных для отображения".to_string(),
    }
}

/// Per-category degradation chains, each ending in the table encoding.
fn degradation_chain(category: ChartCategory) -> &'static [ChartCategory] {
    match category {
        ChartCategory::Line => &[ChartCategory::Line, ChartCategory::Bar, ChartCategory::Table],
        ChartCategory::Pie => &[
            ChartCategory::Pie,
            ChartCategory::Histogram,
            ChartCategory::Table,
        ],
        ChartCategory::Scatter => &[
            ChartCategory::Scatter,
            ChartCategory::Histogram,
            ChartCategory::Table,
        ],
        ChartCategory::Bar => &[ChartCategory::Bar, ChartCategory::Table],
        ChartCategory::Histogram => &[ChartCategory::Histogram, ChartCategory::Table],
        _ => &[ChartCategory::Table],
    }
}

fn try_build(category: ChartCategory, shape: &ResultShape) -> Result<RenderPlan, SelectionError> {
    match category {
        ChartCategory::Bar => {
            let x = first_categorical(shape, category)?;
            let y = first_numeric(shape, category)?;
            Ok(plan(category, &[("x", x), ("y", y)]))
        }
        ChartCategory::Line => {
            let x = shape
                .date_columns
                .first()
                .ok_or(SelectionError::MissingDateColumn { category })?;
            let y = first_numeric(shape, category)?;
            Ok(plan(category, &[("x", x), ("y", y)]))
        }
        ChartCategory::Pie => {
            let labels = first_categorical(shape, category)?;
            // Without a measure the slice values are plain row counts.
            match shape.numeric_columns.first() {
                Some(values) => Ok(plan(category, &[("labels", labels), ("values", values)])),
                None => Ok(plan(category, &[("labels", labels)])),
            }
        }
        ChartCategory::Histogram => {
            let x = first_numeric(shape, category)?;
            Ok(plan(category, &[("x", x)]))
        }
        ChartCategory::Scatter => {
            let mut numerics = shape.numeric_columns.iter();
            let x = numerics
                .next()
                .ok_or(SelectionError::MissingNumericColumn { category })?;
            let y = numerics
                .next()
                .ok_or(SelectionError::MissingNumericColumn { category })?;
            match shape.categorical_columns.first() {
                Some(colour) => Ok(plan(category, &[("x", x), ("y", y), ("colour", colour)])),
                None => Ok(plan(category, &[("x", x), ("y", y)])),
            }
        }
        ChartCategory::Table | ChartCategory::Map | ChartCategory::Auto => {
            if shape.column_count() == 0 {
                return Err(SelectionError::NoColumns);
            }
            Ok(plan(ChartCategory::Table, &[]))
        }
    }
}

fn first_categorical<'a>(
    shape: &'a ResultShape,
    category: ChartCategory,
) -> Result<&'a String, SelectionError> {
    shape
        .categorical_columns
        .first()
        .ok_or(SelectionError::MissingCategoricalColumn { category })
}

fn first_numeric<'a>(
    shape: &'a ResultShape,
    category: ChartCategory,
) -> Result<&'a String, SelectionError> {
    shape
        .numeric_columns
        .first()
        .ok_or(SelectionError::MissingNumericColumn { category })
}

fn plan(category: ChartCategory, mappings: &[(&str, &String)]) -> RenderPlan {
    RenderPlan {
        category,
        mappings: mappings
            .iter()
            .map(|(arg, column)| ((*arg).to_string(), (*column).clone()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape_profiler::ShapeProfiler;
    use serde_json::json;

    fn shape_of(columns: &[&str], rows: Vec<Vec<serde_json::Value>>) -> ResultShape {
        let columns: Vec<String> = columns.iter().map(|s| (*s).to_string()).collect();
        ShapeProfiler::new().profile(&columns, &rows)
    }

    #[test]
    fn dates_with_numbers_auto_detect_as_line() {
        let shape = shape_of(
            &["month", "total_revenue"],
            vec![
                vec![json!("2024-01"), json!(100)],
                vec![json!("2024-02"), json!(200)],
            ],
        );
        // "month" carries no date marker and "2024-01" is not a full date,
        // so this is bar territory; add a real date column for line.
        let dated = shape_of(
            &["date", "total_revenue"],
            vec![vec![json!("2024-01-15"), json!(100)]],
        );
        assert_eq!(auto_detect(&dated), ChartCategory::Line);
        assert_ne!(auto_detect(&shape), ChartCategory::Line);
    }

    #[test]
    fn small_categorical_cardinality_auto_detects_as_pie() {
        let shape = shape_of(
            &["status"],
            vec![
                vec![json!("open")],
                vec![json!("closed")],
                vec![json!("open")],
            ],
        );
        assert_eq!(auto_detect(&shape), ChartCategory::Pie);
    }

    #[test]
    fn single_distinct_value_is_not_a_pie() {
        let shape = shape_of(&["status"], vec![vec![json!("open")], vec![json!("open")]]);
        assert_ne!(auto_detect(&shape), ChartCategory::Pie);
    }

    #[test]
    fn numeric_only_auto_detects_as_histogram() {
        let shape = shape_of(
            &["salary"],
            vec![vec![json!(100)], vec![json!(200)], vec![json!(100)]],
        );
        assert_eq!(auto_detect(&shape), ChartCategory::Histogram);
    }

    #[test]
    fn empty_result_auto_detects_as_table() {
        let shape = shape_of(&["anything"], vec![]);
        assert_eq!(auto_detect(&shape), ChartCategory::Table);
    }

    #[test]
    fn line_without_dates_degrades_to_bar() {
        let shape = shape_of(
            &["department", "count"],
            vec![
                vec![json!("A"), json!(1)],
                vec![json!("B"), json!(2)],
                vec![json!("C"), json!(3)],
                vec![json!("D"), json!(4)],
                vec![json!("E"), json!(5)],
                vec![json!("F"), json!(6)],
                vec![json!("G"), json!(7)],
                vec![json!("H"), json!(8)],
                vec![json!("I"), json!(9)],
            ],
        );
        let outcome = build_render_plan(ChartCategory::Line, &shape);
        assert_eq!(outcome.category(), Some(ChartCategory::Bar));
    }

    #[test]
    fn scatter_without_two_measures_degrades() {
        let shape = shape_of(
            &["value"],
            vec![vec![json!(1)], vec![json!(2)]],
        );
        let outcome = build_render_plan(ChartCategory::Scatter, &shape);
        assert_eq!(outcome.category(), Some(ChartCategory::Histogram));
    }

    #[test]
    fn empty_rows_yield_the_placeholder() {
        let shape = shape_of(&["a", "b"], vec![]);
        let outcome = build_render_plan(ChartCategory::Bar, &shape);
        assert!(matches!(outcome, RenderOutcome::Empty { .. }));
    }

    #[test]
    fn table_is_always_renderable_when_columns_exist() {
        let shape = shape_of(&["whatever"], vec![vec![json!("x")]]);
        let outcome = build_render_plan(ChartCategory::Table, &shape);
        assert_eq!(outcome.category(), Some(ChartCategory::Table));
    }
}
