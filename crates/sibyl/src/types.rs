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

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A synthesized query: parameter-safe text plus the literal parameters it
/// binds. The rest of the system treats the text as opaque; the only
/// invariant callers may rely on is that it ends in exactly one `;`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub text: String,
    pub params: Vec<Value>,
}

impl QueryPlan {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: terminate(text.into()),
            params: Vec::new(),
        }
    }

    pub fn with_params(text: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            text: terminate(text.into()),
            params,
        }
    }
}

/// Normalises trailing whitespace and terminators down to a single `;`.
fn terminate(text: String) -> String {
    let trimmed = text.trim_end().trim_end_matches(';').trim_end();
    format!("{trimmed};")
}

/// The closed set of residual intents the per-table classifier recognises
/// once a table has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Dynamics,
    Monthly,
    Weekly,
    Daily,
    Count,
    Ranking,
    Comparison,
    Revenue,
    Salary,
    Budget,
    RecentPeriod,
    Department,
    Status,
    ActiveWork,
    ShowAll,
    Average,
    Total,
    General,
}

/// What the resolver/classifier pair concluded about one query. Produced
/// per request and discarded with the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub table: Option<String>,
    pub kind: QueryKind,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_text_gains_single_terminator() {
        assert_eq!(QueryPlan::new("SELECT 1").text, "SELECT 1;");
        assert_eq!(QueryPlan::new("SELECT 1;").text, "SELECT 1;");
        assert_eq!(QueryPlan::new("SELECT 1;;  ").text, "SELECT 1;");
        assert_eq!(QueryPlan::new("SELECT 1\n  ").text, "SELECT 1;");
    }
}
