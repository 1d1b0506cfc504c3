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

use crate::types::QueryPlan;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Query execution failed: {0}")]
    Execution(String),
    #[error("Database unavailable: {0}")]
    Unavailable(String),
    #[error("Schema introspection failed: {0}")]
    Introspection(String),
}

/// One executed result set: column names plus row-major values. This is the
/// only shape the core ever sees back from the database collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl TabularResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The database collaborator. Single-shot, non-cancellable; timeout policy
/// belongs to the implementation.
#[async_trait]
pub trait DatabaseExecutor: Send + Sync {
    async fn execute(&self, plan: &QueryPlan) -> Result<TabularResult, ExecutorError>;
}
