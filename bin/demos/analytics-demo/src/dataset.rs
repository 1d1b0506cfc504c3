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

//! Canned stand-in for the database collaborators: a fixed industrial
//! dataset schema plus representative result sets keyed off the shape of
//! the synthesized plan. Enough to drive the engine and the chart
//! selector end to end without a database.

use async_trait::async_trait;
use serde_json::{json, Value};
use sibyl::executor::{DatabaseExecutor, ExecutorError, TabularResult};
use sibyl::schema::{ColumnDescription, SchemaDescription, SchemaIntrospector};
use sibyl::types::QueryPlan;

pub struct StaticDataset;

fn column(name: &str, declared_type: &str, nullable: bool) -> ColumnDescription {
    ColumnDescription {
        name: name.to_string(),
        declared_type: declared_type.to_string(),
        nullable,
    }
}

#[async_trait]
impl SchemaIntrospector for StaticDataset {
    async fn describe(&self) -> Result<SchemaDescription, ExecutorError> {
        let mut schema = SchemaDescription::new();
        schema.insert_table(
            "employees",
            vec![
                column("employee_id", "INTEGER", false),
                column("first_name", "TEXT", false),
                column("last_name", "TEXT", false),
                column("department", "TEXT", true),
                column("position", "TEXT", true),
                column("salary", "REAL", true),
                column("performance_score", "REAL", true),
                column("hire_date", "TEXT", true),
            ],
        );
        schema.insert_table(
            "projects",
            vec![
                column("project_id", "INTEGER", false),
                column("project_name", "TEXT", false),
                column("budget", "REAL", true),
                column("actual_cost", "REAL", true),
                column("status", "TEXT", true),
                column("start_date", "TEXT", true),
                column("manager_id", "INTEGER", true),
            ],
        );
        schema.insert_table(
            "production",
            vec![
                column("production_id", "INTEGER", false),
                column("date", "TEXT", true),
                column("product_name", "TEXT", false),
                column("quantity", "INTEGER", true),
                column("revenue", "REAL", true),
                column("department", "TEXT", true),
                column("project_id", "INTEGER", true),
            ],
        );
        schema.insert_table(
            "equipment",
            vec![
                column("equipment_id", "INTEGER", false),
                column("equipment_name", "TEXT", false),
                column("type", "TEXT", true),
                column("cost", "REAL", true),
                column("status", "TEXT", true),
                column("department", "TEXT", true),
                column("purchase_date", "TEXT", true),
            ],
        );
        schema.insert_table(
            "safety_incidents",
            vec![
                column("incident_id", "INTEGER", false),
                column("date", "TEXT", true),
                column("description", "TEXT", true),
                column("severity", "TEXT", true),
                column("department", "TEXT", true),
                column("resolved", "INTEGER", true),
                column("resolution_time_hours", "REAL", true),
            ],
        );
        Ok(schema)
    }
}

#[async_trait]
impl DatabaseExecutor for StaticDataset {
    async fn execute(&self, plan: &QueryPlan) -> Result<TabularResult, ExecutorError> {
        Ok(canned_result(&plan.text))
    }
}

/// Picks a representative result set by inspecting the plan text. Dates in
/// the daily view deliberately mix both source formats the normaliser
/// recognises.
fn canned_result(sql: &str) -> TabularResult {
    if sql.contains("substr(clean_date, 1, 7)") {
        return table(
            &[
                "month",
                "total_revenue",
                "total_quantity",
                "transaction_count",
                "unique_products",
            ],
            vec![
                vec![json!("2024-01"), json!(1_250_000.0), json!(310), json!(42), json!(5)],
                vec![json!("2024-02"), json!(1_340_000.0), json!(295), json!(39), json!(6)],
                vec![json!("2024-03"), json!(1_515_000.0), json!(350), json!(47), json!(6)],
            ],
        );
    }
    if sql.contains("GROUP BY product_name") {
        return table(
            &["product_name", "total_revenue", "total_quantity"],
            vec![
                vec![json!("ТВЭЛ"), json!(2_940_000.0), json!(520)],
                vec![json!("Изотопы"), json!(1_780_000.0), json!(260)],
                vec![json!("Оборудование АЭС"), json!(1_200_000.0), json!(75)],
                vec![json!("Обучение"), json!(640_000.0), json!(130)],
                vec![json!("Лицензии"), json!(410_000.0), json!(95)],
            ],
        );
    }
    if sql.contains("clean_date as day") {
        return table(
            &["day", "daily_revenue", "daily_quantity", "transaction_count", "unique_products"],
            vec![
                vec![json!("2024-03-29"), json!(86_000.0), json!(21), json!(3), json!(2)],
                vec![json!("2024-03-28"), json!(54_000.0), json!(12), json!(2), json!(2)],
            ],
        );
    }
    if sql.contains("FROM employees") {
        return table(
            &["department", "employee_count"],
            vec![
                vec![json!("Ядерная энергетика"), json!(34)],
                vec![json!("Научные исследования"), json!(27)],
                vec![json!("Безопасность"), json!(18)],
                vec![json!("Логистика"), json!(11)],
            ],
        );
    }
    if sql.contains("FROM projects") {
        return table(
            &["project_name", "budget", "status"],
            vec![
                vec![json!("Модернизация блока №2"), json!(5_400_000.0), json!("В работе")],
                vec![json!("Цифровой двойник"), json!(2_100_000.0), json!("Планирование")],
                vec![json!("Переработка топлива"), json!(3_800_000.0), json!("Завершен")],
            ],
        );
    }
    if sql.contains("FROM equipment") {
        return table(
            &["type", "total_cost"],
            vec![
                vec![json!("Насосы"), json!(740_000.0)],
                vec![json!("Датчики"), json!(230_000.0)],
            ],
        );
    }
    if sql.contains("FROM safety_incidents") {
        return table(
            &["severity", "count"],
            vec![
                vec![json!("Низкая"), json!(14)],
                vec![json!("Средняя"), json!(5)],
                vec![json!("Высокая"), json!(1)],
            ],
        );
    }
    TabularResult::default()
}

fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> TabularResult {
    TabularResult {
        columns: columns.iter().map(|c| (*c).to_string()).collect(),
        rows,
    }
}
