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

//! Residual intent classification once a table has been resolved. A single
//! ordered pass: the fact table gets its temporal pre-checks, then every
//! table shares the same kind checks, first match wins.

use crate::patterns::FACT_TABLE;
use crate::types::QueryKind;

fn contains_any(query_lower: &str, stems: &[&str]) -> bool {
    stems.iter().any(|stem| query_lower.contains(stem))
}

/// Ordered kind checks shared by every table. Declaration order is the
/// tie-break: a query mentioning both "сколько" and "топ" is a count.
const KIND_CHECKS: &[(&[&str], QueryKind)] = &[
    (&["сколько", "количество", "count", "число"], QueryKind::Count),
    (&["топ", "лучш", "первые", "последние"], QueryKind::Ranking),
    (&["сравн", "compare", "против"], QueryKind::Comparison),
    (&["выручк", "revenue", "доход"], QueryKind::Revenue),
    (&["зарплат", "salary"], QueryKind::Salary),
    (&["бюджет", "budget"], QueryKind::Budget),
    (
        &["последний месяц", "за месяц", "месяц"],
        QueryKind::RecentPeriod,
    ),
    (&["отдел", "department"], QueryKind::Department),
    (&["статус", "status"], QueryKind::Status),
    (&["работа", "в работе"], QueryKind::ActiveWork),
    (&["все", "покажи все", "весь"], QueryKind::ShowAll),
    (&["средн", "avg", "average"], QueryKind::Average),
    (&["общ", "total", "итого"], QueryKind::Total),
];

/// Classifies the residual query intent for a resolved table.
pub fn classify(query_lower: &str, table: &str) -> QueryKind {
    if table == FACT_TABLE {
        if contains_any(query_lower, &["динамик", "тренд", "график", "изменени"]) {
            return QueryKind::Dynamics;
        }
        if query_lower.contains("месячн") {
            return QueryKind::Monthly;
        }
        if query_lower.contains("недел") {
            return QueryKind::Weekly;
        }
        if query_lower.contains("дневн") || query_lower.contains("за день") {
            return QueryKind::Daily;
        }
    }
    for (stems, kind) in KIND_CHECKS {
        if contains_any(query_lower, stems) {
            return *kind;
        }
    }
    QueryKind::General
}
