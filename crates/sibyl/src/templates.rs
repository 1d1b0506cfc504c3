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

//! The per-table template bank and its three-level fallback chain:
//! kind-specific template, then the table's general template, then a
//! bounded `SELECT *`. Lookup misses are normal (several kinds have no
//! counterpart on some tables) and must always end in an executable plan.

use crate::patterns::{self, FACT_TABLE};
use crate::sanitize::sanitize_table_name;
use crate::types::{QueryKind, QueryPlan};
use tracing::debug;

/// Row cap for the default bounded `SELECT *`.
const DEFAULT_ROW_LIMIT: u32 = 10;

struct TableTemplates {
    table: &'static str,
    general: &'static str,
    /// Column the ranking fix-up orders by when a "топ" query lands on a
    /// template without an explicit ordering clause.
    importance_column: Option<&'static str>,
    templates: &'static [(QueryKind, &'static str)],
}

const BANK: &[TableTemplates] = &[
    TableTemplates {
        table: "employees",
        general: "SELECT * FROM employees LIMIT 10",
        importance_column: Some("performance_score"),
        templates: &[
            (
                QueryKind::Count,
                "SELECT department, COUNT(*) as employee_count FROM employees GROUP BY department ORDER BY employee_count DESC",
            ),
            (
                QueryKind::Department,
                "SELECT department, COUNT(*) as employee_count FROM employees GROUP BY department ORDER BY employee_count DESC",
            ),
            (
                QueryKind::Salary,
                "SELECT first_name, last_name, department, salary FROM employees ORDER BY salary DESC LIMIT 10",
            ),
            (
                QueryKind::Ranking,
                "SELECT first_name, last_name, department, performance_score FROM employees ORDER BY performance_score DESC LIMIT 5",
            ),
            (QueryKind::ShowAll, "SELECT * FROM employees LIMIT 20"),
            (
                QueryKind::Average,
                "SELECT department, AVG(salary) as avg_salary FROM employees GROUP BY department ORDER BY avg_salary DESC",
            ),
        ],
    },
    TableTemplates {
        table: "projects",
        general: "SELECT * FROM projects LIMIT 10",
        importance_column: None,
        templates: &[
            (
                QueryKind::Budget,
                "SELECT project_name, budget, status FROM projects ORDER BY budget DESC LIMIT 10",
            ),
            (
                QueryKind::Status,
                "SELECT status, COUNT(*) as count FROM projects GROUP BY status",
            ),
            (
                QueryKind::ActiveWork,
                "SELECT project_name, budget, start_date FROM projects WHERE status = 'В работе' ORDER BY budget DESC",
            ),
            (
                QueryKind::Comparison,
                "SELECT project_name, budget, actual_cost FROM projects ORDER BY budget DESC LIMIT 10",
            ),
            (
                QueryKind::ShowAll,
                "SELECT * FROM projects ORDER BY start_date DESC LIMIT 15",
            ),
        ],
    },
    TableTemplates {
        table: "production",
        general: "SELECT \
                  substr(date, 1, 10) as date, \
                  product_name, \
                  revenue, \
                  quantity \
                  FROM production \
                  WHERE revenue IS NOT NULL \
                  ORDER BY date DESC \
                  LIMIT 10",
        importance_column: Some("revenue"),
        templates: &[
            (
                QueryKind::Ranking,
                "SELECT \
                 product_name, \
                 SUM(revenue) as total_revenue, \
                 SUM(quantity) as total_quantity \
                 FROM production \
                 WHERE revenue IS NOT NULL \
                 GROUP BY product_name \
                 ORDER BY total_revenue DESC \
                 LIMIT 5",
            ),
            (
                QueryKind::Revenue,
                "SELECT \
                 product_name, \
                 SUM(revenue) as total_revenue \
                 FROM production \
                 WHERE revenue IS NOT NULL \
                 GROUP BY product_name \
                 ORDER BY total_revenue DESC",
            ),
            (
                QueryKind::RecentPeriod,
                "WITH cleaned_dates AS ( \
                 SELECT \
                 CASE \
                 WHEN date LIKE '____-__-__%' THEN substr(date, 1, 10) \
                 WHEN date LIKE '__.__.____%' THEN \
                 substr(date, 7, 4) || '-' || substr(date, 4, 2) || '-' || substr(date, 1, 2) \
                 ELSE substr(date, 1, 10) END as clean_date, \
                 revenue, \
                 product_name \
                 FROM production \
                 WHERE revenue IS NOT NULL \
                 AND revenue > 0 \
                 ) \
                 SELECT \
                 clean_date as date, \
                 product_name, \
                 revenue \
                 FROM cleaned_dates \
                 WHERE clean_date LIKE '____-__-__' \
                 AND clean_date >= date('now', '-1 month') \
                 ORDER BY clean_date DESC \
                 LIMIT 20",
            ),
            (
                QueryKind::ShowAll,
                "SELECT \
                 substr(date, 1, 10) as date, \
                 product_name, \
                 revenue, \
                 quantity \
                 FROM production \
                 WHERE revenue IS NOT NULL \
                 ORDER BY date DESC \
                 LIMIT 20",
            ),
            (
                QueryKind::Total,
                "SELECT \
                 SUM(revenue) as total_revenue, \
                 SUM(quantity) as total_quantity, \
                 COUNT(*) as total_transactions \
                 FROM production \
                 WHERE revenue IS NOT NULL",
            ),
            (
                QueryKind::Department,
                "SELECT \
                 department, \
                 SUM(revenue) as department_revenue, \
                 COUNT(*) as transaction_count \
                 FROM production \
                 WHERE revenue IS NOT NULL \
                 GROUP BY department \
                 ORDER BY department_revenue DESC",
            ),
        ],
    },
    TableTemplates {
        table: "equipment",
        general: "SELECT * FROM equipment LIMIT 10",
        importance_column: None,
        templates: &[
            (
                QueryKind::Status,
                "SELECT status, COUNT(*) as count FROM equipment GROUP BY status",
            ),
            (
                QueryKind::Department,
                "SELECT department, COUNT(*) as equipment_count FROM equipment GROUP BY department ORDER BY equipment_count DESC",
            ),
            (
                QueryKind::ShowAll,
                "SELECT * FROM equipment ORDER BY purchase_date DESC LIMIT 15",
            ),
            (
                QueryKind::Total,
                "SELECT type, SUM(cost) as total_cost FROM equipment GROUP BY type ORDER BY total_cost DESC",
            ),
        ],
    },
    TableTemplates {
        table: "safety_incidents",
        general: "SELECT * FROM safety_incidents ORDER BY date DESC LIMIT 10",
        importance_column: None,
        templates: &[
            (
                QueryKind::RecentPeriod,
                "SELECT * FROM safety_incidents WHERE date >= date('now', '-1 month') ORDER BY date DESC LIMIT 10",
            ),
            (
                QueryKind::Department,
                "SELECT department, COUNT(*) as incident_count FROM safety_incidents GROUP BY department ORDER BY incident_count DESC",
            ),
            (
                QueryKind::ShowAll,
                "SELECT * FROM safety_incidents ORDER BY date DESC LIMIT 15",
            ),
            (
                QueryKind::Average,
                "SELECT severity, COUNT(*) as count, AVG(resolution_time_hours) as avg_resolution_time FROM safety_incidents GROUP BY severity",
            ),
        ],
    },
];

/// One level of the fallback chain.
trait TemplateRegistry: Send + Sync {
    fn resolve(&self, table: &str, kind: QueryKind) -> Option<String>;
}

/// Level one: the kind-specific template. The fact table's year-month
/// kinds delegate to the time-series builder so the bucketed view has a
/// single definition.
struct SpecificTemplates;

impl TemplateRegistry for SpecificTemplates {
    fn resolve(&self, table: &str, kind: QueryKind) -> Option<String> {
        if table == FACT_TABLE && matches!(kind, QueryKind::Dynamics | QueryKind::Monthly) {
            return Some(patterns::monthly_sales_sql());
        }
        BANK.iter()
            .find(|t| t.table == table)?
            .templates
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, sql)| (*sql).to_string())
    }
}

/// Level two: the table's general template.
struct GeneralTemplates;

impl TemplateRegistry for GeneralTemplates {
    fn resolve(&self, table: &str, _kind: QueryKind) -> Option<String> {
        BANK.iter()
            .find(|t| t.table == table)
            .map(|t| t.general.to_string())
    }
}

/// Level three: a bounded `SELECT *` over the sanitized table name. Always
/// resolves, so the chain cannot come back empty.
struct DefaultTemplate;

impl TemplateRegistry for DefaultTemplate {
    fn resolve(&self, table: &str, _kind: QueryKind) -> Option<String> {
        Some(format!(
            "SELECT * FROM {} LIMIT {DEFAULT_ROW_LIMIT}",
            sanitize_table_name(table)
        ))
    }
}

pub struct TemplateBank {
    chain: Vec<Box<dyn TemplateRegistry>>,
}

impl TemplateBank {
    pub fn new() -> Self {
        Self {
            chain: vec![
                Box::new(SpecificTemplates),
                Box::new(GeneralTemplates),
                Box::new(DefaultTemplate),
            ],
        }
    }

    /// Walks the chain for the first template, applies the ranking fix-up,
    /// and returns a terminated plan.
    pub fn select(&self, table: &str, kind: QueryKind, query_lower: &str) -> QueryPlan {
        let sql = self
            .chain
            .iter()
            .find_map(|registry| registry.resolve(table, kind))
            .unwrap_or_else(|| {
                // The default level always resolves; this arm is dead but
                // keeps the chain walk total.
                format!("SELECT * FROM {} LIMIT {DEFAULT_ROW_LIMIT}", sanitize_table_name(table))
            });
        debug!("Selected template for table '{table}', kind {kind:?}");
        QueryPlan::new(apply_ranking_fixup(sql, query_lower, table))
    }
}

impl Default for TemplateBank {
    fn default() -> Self {
        Self::new()
    }
}

fn importance_column(table: &str) -> Option<&'static str> {
    BANK.iter()
        .find(|t| t.table == table)
        .and_then(|t| t.importance_column)
}

/// Ranking queries must come back ordered: when the text carries ranking
/// vocabulary and the selected template has no ordering clause, order by
/// the table's importance column, descending, ahead of the row limit.
fn apply_ranking_fixup(sql: String, query_lower: &str, table: &str) -> String {
    let is_ranking = query_lower.contains("топ") || query_lower.contains("top");
    if !is_ranking || sql.to_uppercase().contains("ORDER BY") {
        return sql;
    }
    let Some(column) = importance_column(table) else {
        return sql;
    };
    match sql.rfind("LIMIT") {
        Some(pos) => {
            let (head, tail) = sql.split_at(pos);
            format!("{head}ORDER BY {column} DESC {tail}")
        }
        None => sql,
    }
}
