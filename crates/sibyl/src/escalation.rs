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

//! Last-resort synthesis: when resolution comes back undetermined the
//! engine hands the literal query and the table list to the completion
//! collaborator and expects one SQL statement back. Whatever happens, the
//! caller receives a well-formed (if sometimes vacuous) plan — collaborator
//! failures never escape this module.

use crate::llm::core::CompletionAdapter;
use crate::schema::SchemaDescription;
use crate::types::QueryPlan;
use llm_contracts::CompletionRequest;
use std::sync::Arc;
use tracing::{debug, warn};

/// Returned when the collaborator answered but nothing query-shaped could
/// be extracted.
pub const UNRESOLVED_PLACEHOLDER: &str = "SELECT 'Не удалось сгенерировать запрос' as error";

/// Returned when the collaborator call itself failed, or none is wired.
pub const FAILURE_PLACEHOLDER: &str = "SELECT 'Ошибка генерации SQL' as error";

pub struct EscalationFallback {
    adapter: Option<Arc<dyn CompletionAdapter>>,
}

impl EscalationFallback {
    pub fn new(adapter: Arc<dyn CompletionAdapter>) -> Self {
        Self {
            adapter: Some(adapter),
        }
    }

    /// An escalation stage with no collaborator wired; it resolves every
    /// query to the failure placeholder.
    pub fn disabled() -> Self {
        Self { adapter: None }
    }

    pub async fn synthesise(&self, query_text: &str, schema: &SchemaDescription) -> QueryPlan {
        let Some(adapter) = &self.adapter else {
            debug!("No completion collaborator wired; returning placeholder plan");
            return QueryPlan::new(FAILURE_PLACEHOLDER);
        };
        let request = CompletionRequest::new(build_prompt(query_text, schema));
        match adapter.complete(request).await {
            Ok(response) => QueryPlan::new(extract_sql(&response.content)),
            Err(e) => {
                warn!("Completion collaborator failed: {e}");
                QueryPlan::new(FAILURE_PLACEHOLDER)
            }
        }
    }
}

/// The prompt carries the literal query, the table list, and the steering
/// hint that keeps sales/trend questions on the fact table.
fn build_prompt(query_text: &str, schema: &SchemaDescription) -> String {
    let tables: Vec<&str> = schema.table_names().collect();
    format!(
        "The user asks: \"{query_text}\"\n\n\
         Available tables:\n{}\n\n\
         IMPORTANT: if the question concerns sales, trends, dynamics or charts, use the production table.\n\n\
         Return ONLY the SQL statement for this question (no explanations, just SQL):\n\n\
         SQL:",
        tables.join(", ")
    )
}

/// Extracts one statement from a completion: code fences stripped, comment
/// lines dropped, lines kept up to and including the first terminator. A
/// response with no recognisable query keyword becomes the placeholder.
pub(crate) fn extract_sql(response: &str) -> String {
    let stripped = response.replace("```sql", "").replace("```", "");
    let mut sql_lines: Vec<&str> = Vec::new();
    for line in stripped.lines() {
        let line = line.trim();
        if !line.is_empty() && !line.starts_with("--") {
            sql_lines.push(line);
        }
        if line.ends_with(';') {
            break;
        }
    }
    let sql = sql_lines.join(" ");
    if sql.is_empty() || !sql.to_uppercase().contains("SELECT") {
        return UNRESOLVED_PLACEHOLDER.to_string();
    }
    sql
}
