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

use async_trait::async_trait;
use llm_contracts::{CompletionRequest, CompletionResponse, LLMError, LLMResult};
use sibyl::llm::core::CompletionAdapter;
use sibyl::types::QueryKind;
use sibyl::{QueryGenerator, SchemaDescription, SynthesisRoute};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn full_schema() -> Arc<SchemaDescription> {
    let mut schema = SchemaDescription::new();
    for table in sibyl::schema::FALLBACK_TABLES {
        schema.insert_table(table, Vec::new());
    }
    Arc::new(schema)
}

/// Scripted collaborator that records how often it was consulted.
struct ScriptedAdapter {
    reply: LLMResult<&'static str>,
    calls: AtomicUsize,
}

impl ScriptedAdapter {
    fn replying(reply: &'static str) -> Self {
        Self {
            reply: Ok(reply),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            reply: Err(LLMError::Timeout),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionAdapter for ScriptedAdapter {
    async fn complete(&self, request: CompletionRequest) -> LLMResult<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(content) => Ok(CompletionResponse::from_content(request.id, *content)),
            Err(_) => Err(LLMError::Timeout),
        }
    }

    async fn health_check(&self) -> LLMResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn temporal_patterns_short_circuit_table_resolution() {
    let generator = QueryGenerator::new(full_schema());
    let outcome = generator.generate("Покажи динамику продаж за год").await;
    // A pattern hit carries no classification: the resolver never ran.
    assert!(matches!(outcome.route, SynthesisRoute::Pattern { .. }));
    assert!(outcome.classification.is_none());
    assert!(outcome.plan.text.contains("GROUP BY substr(clean_date, 1, 7)"));
}

#[tokio::test]
async fn dynamics_query_buckets_by_month_with_positive_revenue() {
    let generator = QueryGenerator::new(full_schema());
    let outcome = generator.generate("динамика продаж за год").await;
    let text = &outcome.plan.text;
    assert!(text.contains("revenue > 0"));
    assert!(text.contains("ORDER BY month"));
    assert!(text.contains("LIMIT 24"));
    assert!(text.ends_with(';'));
}

#[tokio::test]
async fn top_products_query_aggregates_and_ranks() {
    let generator = QueryGenerator::new(full_schema());
    let outcome = generator.generate("Покажи топ-5 товаров по продажам").await;
    assert_eq!(outcome.route, SynthesisRoute::Resolved);
    let classification = outcome.classification.expect("resolved queries classify");
    assert_eq!(classification.table.as_deref(), Some("production"));
    assert_eq!(classification.kind, QueryKind::Ranking);
    let text = &outcome.plan.text;
    assert!(text.contains("GROUP BY product_name"));
    assert!(text.contains("SUM(revenue)"));
    assert!(text.contains("ORDER BY total_revenue DESC"));
    assert!(text.contains("LIMIT 5"));
}

#[tokio::test]
async fn ranking_fixup_adds_exactly_one_ordering_clause() {
    let generator = QueryGenerator::new(full_schema());
    // Classifies to the general template (no ordering clause, bounded
    // limit) while still carrying ranking vocabulary.
    let outcome = generator.generate("top employee performance").await;
    let classification = outcome.classification.expect("resolved");
    assert_eq!(classification.table.as_deref(), Some("employees"));
    assert_eq!(classification.kind, QueryKind::General);
    let text = &outcome.plan.text;
    assert_eq!(text.matches("ORDER BY").count(), 1);
    assert!(text.contains("ORDER BY performance_score DESC"));
    assert!(text.find("ORDER BY").unwrap() < text.rfind("LIMIT").unwrap());
}

#[tokio::test]
async fn tie_break_resolves_to_first_declared_table() {
    let generator = QueryGenerator::new(full_schema());
    let outcome = generator.generate("отдел").await;
    let classification = outcome.classification.expect("resolved");
    assert_eq!(classification.table.as_deref(), Some("employees"));
}

#[tokio::test]
async fn empty_query_escalates() {
    let adapter = Arc::new(ScriptedAdapter::replying("SELECT * FROM projects;"));
    let generator = QueryGenerator::with_escalation(full_schema(), adapter.clone());
    let outcome = generator.generate("").await;
    assert_eq!(outcome.route, SynthesisRoute::Escalated);
    assert_eq!(adapter.call_count(), 1);
    assert_eq!(outcome.plan.text, "SELECT * FROM projects;");
    let classification = outcome.classification.expect("undetermined still classifies");
    assert!(classification.table.is_none());
}

#[tokio::test]
async fn escalation_strips_fences_and_truncates_at_terminator() {
    let adapter = Arc::new(ScriptedAdapter::replying(
        "```sql\nSELECT name FROM unknown_things;\n```\nHope this helps!",
    ));
    let generator = QueryGenerator::with_escalation(full_schema(), adapter);
    let outcome = generator.generate("что-то совершенно непонятное").await;
    assert_eq!(outcome.plan.text, "SELECT name FROM unknown_things;");
}

#[tokio::test]
async fn failed_collaborator_yields_placeholder_plan() {
    let adapter = Arc::new(ScriptedAdapter::failing());
    let generator = QueryGenerator::with_escalation(full_schema(), adapter.clone());
    let outcome = generator.generate("").await;
    assert_eq!(adapter.call_count(), 1);
    assert!(outcome.plan.text.contains("Ошибка генерации SQL"));
    assert!(outcome.plan.text.ends_with(';'));
}

#[tokio::test]
async fn keyword_free_reply_yields_placeholder_plan() {
    let adapter = Arc::new(ScriptedAdapter::replying("I am unable to write SQL today."));
    let generator = QueryGenerator::with_escalation(full_schema(), adapter);
    let outcome = generator.generate("").await;
    assert!(outcome.plan.text.contains("Не удалось сгенерировать запрос"));
}

#[tokio::test]
async fn patterns_never_consult_the_collaborator() {
    let adapter = Arc::new(ScriptedAdapter::replying("SELECT 1;"));
    let generator = QueryGenerator::with_escalation(full_schema(), adapter.clone());
    generator.generate("график продаж").await;
    assert_eq!(adapter.call_count(), 0);
}
