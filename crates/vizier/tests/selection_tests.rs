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

use serde_json::json;
use vizier::{ChartCategory, ChartSelector, RenderOutcome, ShapeProfiler};

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn query_text_always_outranks_shape_inference() {
    let selector = ChartSelector::new();
    // This shape alone would auto-detect as a line chart (date + numeric),
    // but the text asks for proportions.
    let shape = ShapeProfiler::new().profile(
        &columns(&["date", "revenue"]),
        &[
            vec![json!("2024-01-01"), json!(10)],
            vec![json!("2024-01-02"), json!(20)],
        ],
    );
    assert_eq!(
        selector.category_for("какая доля по отделам", Some(&shape)),
        ChartCategory::Pie
    );
}

#[test]
fn declared_order_puts_ranking_ahead_of_temporal() {
    let selector = ChartSelector::new();
    assert_eq!(
        selector.category_for_query("топ продаж за год"),
        ChartCategory::Bar
    );
    assert_eq!(
        selector.category_for_query("динамика продаж за год"),
        ChartCategory::Line
    );
}

#[test]
fn shape_inference_runs_only_on_auto() {
    let selector = ChartSelector::new();
    let shape = ShapeProfiler::new().profile(
        &columns(&["department", "total"]),
        &[
            vec![json!("Логистика"), json!(5)],
            vec![json!("Энергетика"), json!(7)],
        ],
    );
    // No intent keyword: the shape decides (two distinct categories → pie).
    assert_eq!(
        selector.category_for("что у нас тут", Some(&shape)),
        ChartCategory::Pie
    );
    // Without an executed result set the answer stays Auto.
    assert_eq!(
        selector.category_for("что у нас тут", None),
        ChartCategory::Auto
    );
}

#[test]
fn render_plan_maps_bar_columns() {
    let selector = ChartSelector::new();
    let outcome = selector.render_plan(
        "топ отделов",
        &columns(&["department", "total_revenue"]),
        &[
            vec![json!("Логистика"), json!(100)],
            vec![json!("Энергетика"), json!(200)],
        ],
    );
    match outcome {
        RenderOutcome::Plan(plan) => {
            assert_eq!(plan.category, ChartCategory::Bar);
            assert_eq!(plan.mappings.get("x").map(String::as_str), Some("department"));
            assert_eq!(
                plan.mappings.get("y").map(String::as_str),
                Some("total_revenue")
            );
        }
        RenderOutcome::Empty { .. } => panic!("expected a plan"),
    }
}

#[test]
fn unrenderable_intent_degrades_to_table() {
    let selector = ChartSelector::new();
    // Correlation vocabulary forces scatter, but a single text column can
    // carry neither scatter nor histogram: the guaranteed table remains.
    let outcome = selector.render_plan(
        "есть ли зависимость",
        &columns(&["comment"]),
        &[vec![json!("нет данных, одни слова")]],
    );
    assert_eq!(outcome.category(), Some(ChartCategory::Table));
}

#[test]
fn empty_result_set_yields_the_explicit_placeholder() {
    let selector = ChartSelector::new();
    let outcome = selector.render_plan("топ чего угодно", &columns(&["a"]), &[]);
    assert!(matches!(outcome, RenderOutcome::Empty { .. }));
}
