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

pub mod classifier;
pub mod dates;
pub mod escalation;
pub mod executor;
pub mod generator;
pub mod llm;
pub mod patterns;
pub mod resolver;
pub mod sanitize;
pub mod schema;
pub mod templates;
pub mod types;

pub use dates::NormalisedDate;
pub use executor::{DatabaseExecutor, ExecutorError, TabularResult};
pub use generator::{QueryGenerator, SynthesisOutcome, SynthesisRoute};
pub use llm::core::CompletionAdapter;
pub use resolver::{Resolution, TableResolver};
pub use schema::{ColumnDescription, SchemaDescription, SchemaIntrospector};
pub use types::{ClassificationResult, QueryKind, QueryPlan};
