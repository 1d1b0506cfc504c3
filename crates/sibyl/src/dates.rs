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

//! Normalisation of the heterogeneous date shapes that coexist in the fact
//! table's date column. Two shapes are recognised (`YYYY-MM-DD` and
//! `DD.MM.YYYY`, each with an optional suffix); everything else is reduced
//! to a best-effort slice that downstream filters must re-validate with
//! [`is_canonical_shape`] before trusting.

use serde::{Deserialize, Serialize};

/// Outcome of normalising one raw date value. `BestEffort` carries a slice
/// with no validity guarantee; the tag keeps the strict-filtering step
/// visible instead of hiding it behind string-prefix assumptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalisedDate {
    Canonical(String),
    BestEffort(String),
}

impl NormalisedDate {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Canonical(s) | Self::BestEffort(s) => s,
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, Self::Canonical(_))
    }
}

/// Converts a raw date-like value into canonical `YYYY-MM-DD` form where
/// the shape is recognised, and a best-effort 10-character slice where it
/// is not. Total: never fails, never panics.
///
/// Shape recognition mirrors the SQL `LIKE` filters this engine emits
/// (`'____-__-__%'` / `'__.__.____%'`): separator positions decide, not
/// digit content. Strict digit validation is the caller's re-check.
pub fn normalise(raw: &str) -> NormalisedDate {
    let bytes = raw.as_bytes();
    if bytes.len() >= 10 && bytes[4] == b'-' && bytes[7] == b'-' {
        if let Some(head) = raw.get(..10) {
            return NormalisedDate::Canonical(head.to_string());
        }
    }
    if bytes.len() >= 10 && bytes[2] == b'.' && bytes[5] == b'.' {
        if let (Some(year), Some(month), Some(day)) =
            (raw.get(6..10), raw.get(3..5), raw.get(..2))
        {
            return NormalisedDate::Canonical(format!("{year}-{month}-{day}"));
        }
    }
    NormalisedDate::BestEffort(raw.chars().take(10).collect())
}

/// The strict shape check applied before a normalised value may be trusted:
/// exactly ten characters with dashes in the separator positions, matching
/// the SQL-side `LIKE '____-__-__'` filter.
pub fn is_canonical_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-'
}

/// Emits the SQL expression performing the same normalisation in-query, so
/// the time-series builders and the in-process function share a single
/// definition of "clean date".
pub fn clean_date_sql(column: &str) -> String {
    format!(
        "CASE \
         WHEN {column} LIKE '____-__-__%' THEN substr({column}, 1, 10) \
         WHEN {column} LIKE '__.__.____%' THEN \
         substr({column}, 7, 4) || '-' || substr({column}, 4, 2) || '-' || substr({column}, 1, 2) \
         ELSE substr({column}, 1, 10) END"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn iso_prefix_is_canonical() {
        assert_eq!(
            normalise("2023-07-04T10:00:00"),
            NormalisedDate::Canonical("2023-07-04".into())
        );
        assert_eq!(
            normalise("2023-07-04"),
            NormalisedDate::Canonical("2023-07-04".into())
        );
    }

    #[test]
    fn dotted_shape_is_rearranged() {
        assert_eq!(
            normalise("04.07.2023"),
            NormalisedDate::Canonical("2023-07-04".into())
        );
        assert_eq!(
            normalise("04.07.2023 10:00"),
            NormalisedDate::Canonical("2023-07-04".into())
        );
    }

    #[test]
    fn unknown_shapes_become_best_effort_slices() {
        assert_eq!(
            normalise("July 4th, 2023"),
            NormalisedDate::BestEffort("July 4th,".into())
        );
        assert_eq!(normalise(""), NormalisedDate::BestEffort(String::new()));
        assert!(!normalise("not a date").is_canonical());
    }

    #[test]
    fn strict_shape_check() {
        assert!(is_canonical_shape("2023-07-04"));
        assert!(!is_canonical_shape("2023-07-04T10"));
        assert!(!is_canonical_shape("04.07.2023"));
        assert!(!is_canonical_shape(""));
    }

    proptest! {
        #[test]
        fn normalise_is_total(raw in ".*") {
            let out = normalise(&raw);
            prop_assert!(out.as_str().chars().count() <= 10 || out.is_canonical());
        }

        #[test]
        fn canonical_results_pass_the_strict_check(raw in ".*") {
            if let NormalisedDate::Canonical(s) = normalise(&raw) {
                prop_assert!(is_canonical_shape(&s));
            }
        }
    }
}
