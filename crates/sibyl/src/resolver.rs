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

//! Two-tier table resolution: weighted keyword scoring first, then a
//! coarse single-keyword pass that exists only so very short queries do
//! not come back undetermined. Some tables share vocabulary ("отдел"
//! appears in several), so ties must break by declaration order.

use crate::schema::SchemaDescription;
use tracing::debug;

/// Score contributions. The bonus magnitudes are tuned, not principled;
/// only their relative ordering matters (temporal/ranking vocabulary must
/// reliably pull the fact table ahead of keyword overlap elsewhere).
pub mod scoring {
    pub const KEYWORD_HIT: u32 = 1;
    pub const TEMPORAL_BONUS: u32 = 5;
    pub const RANKING_BONUS: u32 = 3;
    pub const REVENUE_BONUS: u32 = 2;
}

struct TableKeywords {
    table: &'static str,
    keywords: &'static [&'static str],
}

/// Keyword sets per table, in declaration order. Entries are stems matched
/// by substring containment, which is what makes the Russian inflections
/// ("продаж" → "продажи", "продажах") work without morphology.
const WEIGHT_TABLE: &[TableKeywords] = &[
    TableKeywords {
        table: "employees",
        keywords: &[
            "сотрудник",
            "employee",
            "работник",
            "персонал",
            "зарплат",
            "salary",
            "должность",
            "position",
            "отдел",
            "department",
            "эффективность",
            "performance",
            "прием",
            "hire",
            "устроился",
        ],
    },
    TableKeywords {
        table: "projects",
        keywords: &[
            "проект",
            "project",
            "бюджет",
            "budget",
            "статус",
            "status",
            "начало",
            "start",
            "окончание",
            "end",
            "руководитель",
            "manager",
            "планирование",
            "planning",
            "завершен",
            "completed",
        ],
    },
    TableKeywords {
        table: "production",
        keywords: &[
            "продаж",
            "sale",
            "production",
            "производств",
            "товар",
            "product",
            "выручк",
            "revenue",
            "доход",
            "income",
            "количество",
            "quantity",
            "топ",
            "top",
            "лучш",
            "лидер",
            "продукт",
            "товарооборот",
            "динамик",
            "тренд",
            "график",
            "изменени",
            "период",
            "год",
            "месяц",
            "недел",
            "день",
        ],
    },
    TableKeywords {
        table: "equipment",
        keywords: &[
            "оборудован",
            "equipment",
            "техника",
            "машина",
            "стоимость",
            "cost",
            "покупк",
            "purchase",
            "обслуживан",
            "maintenance",
            "отдел",
            "department",
            "тип",
            "type",
            "исправно",
            "working",
            "ремонт",
            "repair",
        ],
    },
    TableKeywords {
        table: "safety_incidents",
        keywords: &[
            "инцидент",
            "incident",
            "безопасность",
            "safety",
            "авария",
            "происшествие",
            "серьезность",
            "severity",
            "решен",
            "resolved",
            "время решения",
            "resolution time",
            "описание",
            "description",
        ],
    },
];

/// Vocabulary clusters that earn the fact table its bonuses.
const TEMPORAL_VOCABULARY: &[&str] = &[
    "динамик", "тренд", "график", "год", "месяц", "недел", "день",
];
const REVENUE_VOCABULARY: &[&str] = &["выручк", "продаж"];

/// The coarse second pass: one rule per table, first match wins. A rule
/// whose keyword matches but whose table is absent ends resolution — it
/// does not fall through to later rules.
const HEURISTIC_RULES: &[(&[&str], &str)] = &[
    (&["сотрудник", "employee"], "employees"),
    (&["проект", "project"], "projects"),
    (&["продаж", "товар", "топ"], "production"),
    (&["оборудован"], "equipment"),
    (&["инцидент", "безопасность"], "safety_incidents"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Table { name: String, score: u32 },
    Undetermined,
}

pub struct TableResolver;

impl TableResolver {
    pub fn new() -> Self {
        Self
    }

    /// Scores every table present in the schema and picks the strict
    /// winner; zero best score falls to the heuristic pass.
    pub fn resolve(&self, query_lower: &str, schema: &SchemaDescription) -> Resolution {
        let mut best: Option<(&'static str, u32)> = None;
        for entry in WEIGHT_TABLE {
            if !schema.contains_table(entry.table) {
                continue;
            }
            let score = score_table(query_lower, entry.table);
            // Strict comparison keeps the first-declared table on ties.
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((entry.table, score));
            }
        }
        if let Some((table, score)) = best {
            debug!("Resolved table '{table}' with score {score}");
            return Resolution::Table {
                name: table.to_string(),
                score,
            };
        }
        self.heuristic_pass(query_lower, schema)
    }

    fn heuristic_pass(&self, query_lower: &str, schema: &SchemaDescription) -> Resolution {
        for (stems, table) in HEURISTIC_RULES {
            if stems.iter().any(|stem| query_lower.contains(stem)) {
                if schema.contains_table(table) {
                    debug!("Heuristic pass resolved table '{table}'");
                    return Resolution::Table {
                        name: (*table).to_string(),
                        score: 0,
                    };
                }
                return Resolution::Undetermined;
            }
        }
        Resolution::Undetermined
    }
}

impl Default for TableResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure scoring function: keyword hits plus the table's bonus predicates.
pub fn score_table(query_lower: &str, table: &str) -> u32 {
    let Some(entry) = WEIGHT_TABLE.iter().find(|e| e.table == table) else {
        return 0;
    };
    let mut score = entry
        .keywords
        .iter()
        .filter(|stem| query_lower.contains(*stem))
        .count() as u32
        * scoring::KEYWORD_HIT;
    if table == "production" {
        if TEMPORAL_VOCABULARY
            .iter()
            .any(|stem| query_lower.contains(stem))
        {
            score += scoring::TEMPORAL_BONUS;
        }
        if query_lower.contains("топ") {
            score += scoring::RANKING_BONUS;
        }
        if REVENUE_VOCABULARY
            .iter()
            .any(|stem| query_lower.contains(stem))
        {
            score += scoring::REVENUE_BONUS;
        }
    }
    score
}
