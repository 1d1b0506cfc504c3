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

//! The ordered library of temporal-aggregation triggers. These intents
//! always target the `production` fact table, so a hit here returns a
//! finished plan and skips table resolution entirely. Rule order is
//! semantic: the first matching trigger wins.

use crate::dates::clean_date_sql;
use crate::schema::SchemaDescription;
use crate::types::QueryPlan;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use tracing::debug;

/// Fact table every pattern handler aggregates over.
pub const FACT_TABLE: &str = "production";

/// Bucket caps: two years of months, twenty weeks, and the daily window.
const MONTHLY_BUCKET_CAP: u32 = 24;
const WEEKLY_BUCKET_CAP: u32 = 20;
const DAILY_WINDOW_SHORT: u32 = 7;
const DAILY_WINDOW_DEFAULT: u32 = 30;

/// Epoch-placeholder bucket excluded from year-month output.
const ZERO_BUCKET: &str = "1900-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBucket {
    Monthly,
    Weekly,
    Daily,
}

/// Trigger table in evaluation order. The dynamics/trend/chart phrasings
/// all collapse to the year-month view.
const RULE_TABLE: &[(&str, TimeBucket)] = &[
    (r"динамик[а-я]* продаж", TimeBucket::Monthly),
    (r"тренд[а-я]* продаж", TimeBucket::Monthly),
    (r"изменени[а-я]* продаж", TimeBucket::Monthly),
    (r"продажи за последний год", TimeBucket::Monthly),
    (r"продажи за год", TimeBucket::Monthly),
    (r"месячн[а-я]* продаж[а-я]*", TimeBucket::Monthly),
    (r"еженедельн[а-я]* продаж[а-я]*", TimeBucket::Weekly),
    (r"дневн[а-я]* продаж[а-я]*", TimeBucket::Daily),
    (r"продажи по месяцам", TimeBucket::Monthly),
    (r"продажи по неделям", TimeBucket::Weekly),
    (r"продажи по дням", TimeBucket::Daily),
    (r"график продаж", TimeBucket::Monthly),
    (r"выручка за период", TimeBucket::Monthly),
];

lazy_static! {
    static ref COMPILED_RULES: Vec<(&'static str, Regex, TimeBucket)> = RULE_TABLE
        .iter()
        .map(|&(pattern, bucket)| {
            let regex = Regex::new(pattern).expect("pattern table entry must compile");
            (pattern, regex, bucket)
        })
        .collect();
}

pub struct PatternLibrary;

impl PatternLibrary {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates the triggers in declaration order over the lowercased
    /// query text; returns the first hit.
    pub fn first_match(&self, query_lower: &str) -> Option<(&'static str, TimeBucket)> {
        for (pattern, regex, bucket) in COMPILED_RULES.iter() {
            if regex.is_match(query_lower) {
                debug!("Temporal pattern matched: {pattern}");
                return Some((*pattern, *bucket));
            }
        }
        None
    }

    /// Builds the aggregation plan for a matched bucket. When the fact
    /// table is missing from the schema the plan is a well-formed
    /// placeholder rather than an error.
    pub fn build_plan(
        &self,
        bucket: TimeBucket,
        query_lower: &str,
        schema: &SchemaDescription,
    ) -> QueryPlan {
        if !schema.contains_table(FACT_TABLE) {
            return QueryPlan::new(format!(
                "SELECT 'Таблица {FACT_TABLE} не найдена' as error;"
            ));
        }
        match bucket {
            TimeBucket::Monthly => QueryPlan::new(monthly_sales_sql()),
            TimeBucket::Weekly => QueryPlan::new(weekly_sales_sql()),
            TimeBucket::Daily => {
                let window = daily_window(query_lower);
                QueryPlan::with_params(daily_sales_sql(), vec![json!(window)])
            }
        }
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Window length for the daily view: a "last week" sub-phrase narrows it
/// to seven days, otherwise a month of days.
fn daily_window(query_lower: &str) -> u32 {
    if query_lower.contains("последнюю неделю") {
        DAILY_WINDOW_SHORT
    } else {
        DAILY_WINDOW_DEFAULT
    }
}

/// CTE shared by every bucket view: normalise the date column and keep only
/// rows with a present, positive revenue measure.
fn cleaned_dates_cte() -> String {
    format!(
        "WITH cleaned_dates AS (\n\
         \x20   SELECT\n\
         \x20       {clean} as clean_date,\n\
         \x20       revenue,\n\
         \x20       quantity,\n\
         \x20       product_name\n\
         \x20   FROM {FACT_TABLE}\n\
         \x20   WHERE revenue IS NOT NULL\n\
         \x20       AND revenue > 0\n\
         )",
        clean = clean_date_sql("date")
    )
}

pub(crate) fn monthly_sales_sql() -> String {
    format!(
        "{cte}\n\
         SELECT\n\
         \x20   substr(clean_date, 1, 7) as month,\n\
         \x20   SUM(revenue) as total_revenue,\n\
         \x20   SUM(quantity) as total_quantity,\n\
         \x20   COUNT(*) as transaction_count,\n\
         \x20   COUNT(DISTINCT product_name) as unique_products\n\
         FROM cleaned_dates\n\
         WHERE clean_date LIKE '____-__-__'\n\
         \x20   AND substr(clean_date, 1, 7) != '{ZERO_BUCKET}'\n\
         GROUP BY substr(clean_date, 1, 7)\n\
         HAVING COUNT(*) > 0\n\
         ORDER BY month\n\
         LIMIT {MONTHLY_BUCKET_CAP}",
        cte = cleaned_dates_cte()
    )
}

fn weekly_sales_sql() -> String {
    format!(
        "{cte},\n\
         valid_dates AS (\n\
         \x20   SELECT * FROM cleaned_dates WHERE clean_date LIKE '____-__-__'\n\
         )\n\
         SELECT\n\
         \x20   strftime('%Y-%W', clean_date) as week,\n\
         \x20   MIN(clean_date) as week_start,\n\
         \x20   SUM(revenue) as total_revenue,\n\
         \x20   SUM(quantity) as total_quantity,\n\
         \x20   COUNT(*) as transaction_count,\n\
         \x20   COUNT(DISTINCT product_name) as unique_products\n\
         FROM valid_dates\n\
         GROUP BY strftime('%Y-%W', clean_date)\n\
         HAVING COUNT(*) > 0\n\
         ORDER BY week_start\n\
         LIMIT {WEEKLY_BUCKET_CAP}",
        cte = cleaned_dates_cte()
    )
}

fn daily_sales_sql() -> String {
    format!(
        "{cte},\n\
         valid_dates AS (\n\
         \x20   SELECT * FROM cleaned_dates WHERE clean_date LIKE '____-__-__'\n\
         )\n\
         SELECT\n\
         \x20   clean_date as day,\n\
         \x20   SUM(revenue) as daily_revenue,\n\
         \x20   SUM(quantity) as daily_quantity,\n\
         \x20   COUNT(*) as transaction_count,\n\
         \x20   COUNT(DISTINCT product_name) as unique_products\n\
         FROM valid_dates\n\
         GROUP BY clean_date\n\
         HAVING COUNT(*) > 0\n\
         ORDER BY day DESC\n\
         LIMIT ?",
        cte = cleaned_dates_cte()
    )
}
