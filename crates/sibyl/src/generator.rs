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

//! The synthesis pipeline: temporal patterns short-circuit, otherwise the
//! table resolver and per-table classifier pick a template, and an
//! undetermined table escalates to the completion collaborator. Every path
//! ends in a well-formed plan.

use crate::classifier::classify;
use crate::escalation::EscalationFallback;
use crate::llm::core::CompletionAdapter;
use crate::patterns::PatternLibrary;
use crate::resolver::{Resolution, TableResolver};
use crate::schema::SchemaDescription;
use crate::templates::TemplateBank;
use crate::types::{ClassificationResult, QueryKind, QueryPlan};
use std::sync::Arc;
use tracing::{debug, info};

/// Which path produced a plan. Tests lean on this to verify the
/// short-circuit guarantees without instrumenting internals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisRoute {
    /// A temporal pattern matched; table resolution never ran.
    Pattern { trigger: &'static str },
    /// The resolver picked a table and a template supplied the plan.
    Resolved,
    /// Resolution was undetermined; the escalation fallback answered.
    Escalated,
}

#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub plan: QueryPlan,
    pub route: SynthesisRoute,
    pub classification: Option<ClassificationResult>,
}

pub struct QueryGenerator {
    schema: Arc<SchemaDescription>,
    patterns: PatternLibrary,
    resolver: TableResolver,
    bank: TemplateBank,
    escalation: EscalationFallback,
}

impl QueryGenerator {
    /// An engine without a completion collaborator: undetermined queries
    /// resolve to the placeholder plan.
    pub fn new(schema: Arc<SchemaDescription>) -> Self {
        Self {
            schema,
            patterns: PatternLibrary::new(),
            resolver: TableResolver::new(),
            bank: TemplateBank::new(),
            escalation: EscalationFallback::disabled(),
        }
    }

    pub fn with_escalation(
        schema: Arc<SchemaDescription>,
        adapter: Arc<dyn CompletionAdapter>,
    ) -> Self {
        Self {
            escalation: EscalationFallback::new(adapter),
            ..Self::new(schema)
        }
    }

    pub fn schema(&self) -> &SchemaDescription {
        &self.schema
    }

    /// Synthesizes a plan for one free-text question.
    pub async fn generate(&self, query_text: &str) -> SynthesisOutcome {
        let query_lower = query_text.to_lowercase();

        if let Some((trigger, bucket)) = self.patterns.first_match(&query_lower) {
            info!("Query matched temporal pattern '{trigger}'");
            return SynthesisOutcome {
                plan: self.patterns.build_plan(bucket, &query_lower, &self.schema),
                route: SynthesisRoute::Pattern { trigger },
                classification: None,
            };
        }

        match self.resolver.resolve(&query_lower, &self.schema) {
            Resolution::Table { name, score } => {
                let kind = classify(&query_lower, &name);
                debug!("Classified query as {kind:?} against table '{name}'");
                let plan = self.bank.select(&name, kind, &query_lower);
                SynthesisOutcome {
                    plan,
                    route: SynthesisRoute::Resolved,
                    classification: Some(ClassificationResult {
                        table: Some(name),
                        kind,
                        score,
                    }),
                }
            }
            Resolution::Undetermined => {
                info!("Table resolution undetermined; escalating");
                let plan = self.escalation.synthesise(query_text, &self.schema).await;
                SynthesisOutcome {
                    plan,
                    route: SynthesisRoute::Escalated,
                    classification: Some(ClassificationResult {
                        table: None,
                        kind: QueryKind::General,
                        score: 0,
                    }),
                }
            }
        }
    }
}
