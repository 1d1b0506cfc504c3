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

//! Phase one of chart selection: an ordered keyword-to-category mapping
//! over the lowercased query text. Declaration order is the priority
//! order — ranking vocabulary outranks temporal, and the financial
//! cluster is a deliberate low-priority fallback to `Bar`.

use crate::category::ChartCategory;

const CATEGORY_RULES: &[(ChartCategory, &[&str])] = &[
    (
        ChartCategory::Bar,
        &[
            "топ",
            "топ-",
            "первые",
            "последние",
            "лучшие",
            "худшие",
            "больше всего",
        ],
    ),
    (
        ChartCategory::Line,
        &[
            "тренд", "изменен", "динамика", "истори", "времен", "месяц", "год", "недел", "день",
        ],
    ),
    (
        ChartCategory::Histogram,
        &[
            "распределен",
            "частота",
            "сколько",
            "количество",
            "сколько всего",
        ],
    ),
    (
        ChartCategory::Pie,
        &[
            "сравнен",
            "процент",
            "доля",
            "соотношен",
            "часть",
            "какой процент",
        ],
    ),
    (
        ChartCategory::Scatter,
        &["корреляц", "зависимос", "связь", "зависит"],
    ),
    (
        ChartCategory::Table,
        &["таблица", "список", "перечень", "все"],
    ),
    (ChartCategory::Map, &["карта", "гео", "локац"]),
    // Financial vocabulary usually reads best as columns; checked last so
    // a more specific intent word above always wins.
    (
        ChartCategory::Bar,
        &["выручк", "доход", "прибыль", "бюджет", "зарплат", "стоимость"],
    ),
];

/// Returns the first category whose trigger set intersects the text, or
/// `Auto` when none does.
pub fn match_category(query_lower: &str) -> ChartCategory {
    for (category, stems) in CATEGORY_RULES {
        if stems.iter().any(|stem| query_lower.contains(stem)) {
            return *category;
        }
    }
    ChartCategory::Auto
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_vocabulary_outranks_temporal() {
        // Both a ranking and a temporal word: the ranking rule is declared
        // first and must win.
        assert_eq!(match_category("топ продаж за месяц"), ChartCategory::Bar);
    }

    #[test]
    fn temporal_vocabulary_selects_line() {
        assert_eq!(match_category("динамика выручки"), ChartCategory::Line);
        assert_eq!(match_category("изменения за период"), ChartCategory::Line);
    }

    #[test]
    fn financial_fallback_is_lowest_priority() {
        assert_eq!(match_category("общая выручка"), ChartCategory::Bar);
        // A listing word above the financial cluster takes precedence.
        assert_eq!(match_category("список по стоимости"), ChartCategory::Table);
    }

    #[test]
    fn unmatched_text_defers_to_shape_inference() {
        assert_eq!(match_category("интересные факты"), ChartCategory::Auto);
        assert_eq!(match_category(""), ChartCategory::Auto);
    }
}
