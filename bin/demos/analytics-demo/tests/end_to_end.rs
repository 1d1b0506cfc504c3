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

//! The full path both halves of the core walk for one question: synthesize
//! a plan from the text, then pick a chart for the same text and the
//! executed rows.

use serde_json::json;
use sibyl::types::QueryKind;
use sibyl::{QueryGenerator, SchemaDescription, SynthesisRoute};
use std::sync::Arc;
use vizier::{ChartCategory, ChartSelector};

fn schema() -> Arc<SchemaDescription> {
    let mut schema = SchemaDescription::new();
    for table in sibyl::schema::FALLBACK_TABLES {
        schema.insert_table(table, Vec::new());
    }
    Arc::new(schema)
}

#[tokio::test]
async fn top_products_question_yields_ranked_aggregate_and_bar_chart() {
    let question = "Покажи топ-5 товаров по продажам";
    let generator = QueryGenerator::new(schema());
    let outcome = generator.generate(question).await;

    assert_eq!(outcome.route, SynthesisRoute::Resolved);
    let classification = outcome.classification.expect("resolved");
    assert_eq!(classification.table.as_deref(), Some("production"));
    assert_eq!(classification.kind, QueryKind::Ranking);
    let sql = &outcome.plan.text;
    assert!(sql.contains("GROUP BY product_name"));
    assert!(sql.contains("SUM(revenue)"));
    assert!(sql.contains("ORDER BY total_revenue DESC"));
    assert!(sql.contains("LIMIT 5"));

    // Chart selection sees the same text plus the executed rows.
    let selector = ChartSelector::new();
    let columns = vec!["product_name".to_string(), "total_revenue".to_string()];
    let rows = vec![
        vec![json!("ТВЭЛ"), json!(2_940_000.0)],
        vec![json!("Изотопы"), json!(1_780_000.0)],
    ];
    let shape = selector.profiler().profile(&columns, &rows);
    assert_eq!(
        selector.category_for(question, Some(&shape)),
        ChartCategory::Bar
    );
}

#[tokio::test]
async fn sales_dynamics_question_yields_monthly_buckets_and_line_chart() {
    let question = "динамика продаж за год";
    let generator = QueryGenerator::new(schema());
    let outcome = generator.generate(question).await;

    assert!(matches!(outcome.route, SynthesisRoute::Pattern { .. }));
    let sql = &outcome.plan.text;
    assert!(sql.contains("revenue > 0"));
    assert!(sql.contains("GROUP BY substr(clean_date, 1, 7)"));
    assert!(sql.contains("ORDER BY month"));
    assert!(sql.contains("LIMIT 24"));

    let selector = ChartSelector::new();
    assert_eq!(selector.category_for_query(question), ChartCategory::Line);
}

#[tokio::test]
async fn shape_inference_is_ignored_when_the_text_decides() {
    // A shape that would auto-detect as pie must not override the explicit
    // ranking intent in the text.
    let selector = ChartSelector::new();
    let columns = vec!["status".to_string()];
    let rows = vec![vec![json!("open")], vec![json!("closed")]];
    let shape = selector.profiler().profile(&columns, &rows);
    assert_eq!(vizier::auto_detect(&shape), ChartCategory::Pie);
    assert_eq!(
        selector.category_for("топ инцидентов", Some(&shape)),
        ChartCategory::Bar
    );
}
