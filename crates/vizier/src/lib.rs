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

pub mod category;
pub mod error;
pub mod intent_matcher;
pub mod selector;
pub mod shape_profiler;

pub use category::ChartCategory;
pub use error::SelectionError;
pub use selector::{auto_detect, RenderOutcome, RenderPlan};
pub use shape_profiler::{ResultShape, ShapeProfiler};

/// Two-phase chart selection: the query text decides first, and only when
/// it says nothing does the shape of the executed result set decide. The
/// same tabular shape can legitimately be visualised several ways, so the
/// user's phrasing always outranks shape inference.
pub struct ChartSelector {
    profiler: ShapeProfiler,
}

impl ChartSelector {
    pub fn new() -> Self {
        Self {
            profiler: ShapeProfiler::new(),
        }
    }

    /// Phase one alone: the category the query text asks for, or `Auto`.
    pub fn category_for_query(&self, query_text: &str) -> ChartCategory {
        intent_matcher::match_category(&query_text.to_lowercase())
    }

    /// Both phases: shape inference runs only when the text said nothing.
    pub fn category_for(&self, query_text: &str, shape: Option<&ResultShape>) -> ChartCategory {
        match self.category_for_query(query_text) {
            ChartCategory::Auto => shape.map_or(ChartCategory::Auto, auto_detect),
            category => category,
        }
    }

    /// Full selection: profile the executed result set, pick a category,
    /// and construct a render plan, degrading rather than failing.
    pub fn render_plan(
        &self,
        query_text: &str,
        columns: &[String],
        rows: &[Vec<serde_json::Value>],
    ) -> RenderOutcome {
        let shape = self.profiler.profile(columns, rows);
        let category = self.category_for(query_text, Some(&shape));
        selector::build_render_plan(category, &shape)
    }

    pub fn profiler(&self) -> &ShapeProfiler {
        &self.profiler
    }
}

impl Default for ChartSelector {
    fn default() -> Self {
        Self::new()
    }
}
