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

use crate::executor::ExecutorError;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Table list assumed when introspection is unavailable. Matches the fixed
/// dataset the engine's weight tables and template bank are written for.
pub const FALLBACK_TABLES: [&str; 5] = [
    "employees",
    "projects",
    "production",
    "equipment",
    "safety_incidents",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    pub declared_type: String,
    pub nullable: bool,
}

/// Read-only snapshot of the tables visible to the engine. Built once at
/// startup; never mutated afterwards, so it can be shared across requests
/// without locking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDescription {
    tables: IndexMap<String, Vec<ColumnDescription>>,
}

impl SchemaDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table. Re-inserting an existing name replaces its
    /// columns without changing its position.
    pub fn insert_table(&mut self, name: impl Into<String>, columns: Vec<ColumnDescription>) {
        self.tables.insert(name.into(), columns);
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn columns(&self, table: &str) -> Option<&[ColumnDescription]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// The introspection collaborator that populates the snapshot.
#[async_trait]
pub trait SchemaIntrospector: Send + Sync {
    async fn describe(&self) -> Result<SchemaDescription, ExecutorError>;
}

/// Loads the schema snapshot once, falling back to the static table list
/// when the collaborator fails or reports nothing.
pub async fn load_schema(introspector: &dyn SchemaIntrospector) -> SchemaDescription {
    match introspector.describe().await {
        Ok(schema) if !schema.is_empty() => {
            info!("Loaded schema snapshot with {} tables", schema.table_count());
            schema
        }
        Ok(_) => {
            warn!("Introspection returned an empty schema; using fallback table list");
            fallback_schema()
        }
        Err(e) => {
            warn!("Schema introspection failed ({e}); using fallback table list");
            fallback_schema()
        }
    }
}

fn fallback_schema() -> SchemaDescription {
    let mut schema = SchemaDescription::new();
    for table in FALLBACK_TABLES {
        schema.insert_table(table, Vec::new());
    }
    schema
}
