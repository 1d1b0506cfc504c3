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

mod dataset;

use dataset::StaticDataset;
use sibyl::executor::DatabaseExecutor;
use sibyl::llm::openrouter::OpenRouterAdapter;
use sibyl::{QueryGenerator, SynthesisRoute};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{info, warn};
use vizier::{ChartSelector, RenderOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    dotenvy::dotenv().ok();
    info!("Starting analytics demo");

    let dataset = Arc::new(StaticDataset);
    let schema = Arc::new(sibyl::schema::load_schema(dataset.as_ref()).await);
    info!("Schema loaded with {} tables", schema.table_count());

    let generator = match OpenRouterAdapter::from_env() {
        Ok(adapter) => {
            info!("Completion collaborator available; escalation enabled");
            QueryGenerator::with_escalation(schema.clone(), Arc::new(adapter))
        }
        Err(e) => {
            warn!("Running without escalation: {e}");
            QueryGenerator::new(schema.clone())
        }
    };
    let selector = ChartSelector::new();

    println!("Ask an analytics question (empty line to exit):");
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            break;
        }

        let outcome = generator.generate(question).await;
        match &outcome.route {
            SynthesisRoute::Pattern { trigger } => {
                println!("[temporal pattern: {trigger}]");
            }
            SynthesisRoute::Resolved => {
                if let Some(classification) = &outcome.classification {
                    println!(
                        "[table: {}, kind: {:?}, score: {}]",
                        classification.table.as_deref().unwrap_or("?"),
                        classification.kind,
                        classification.score
                    );
                }
            }
            SynthesisRoute::Escalated => println!("[escalated to the language model]"),
        }
        println!("SQL: {}", outcome.plan.text);

        let result = dataset.execute(&outcome.plan).await?;
        println!("Rows returned: {}", result.row_count());

        match selector.render_plan(question, &result.columns, &result.rows) {
            RenderOutcome::Plan(plan) => {
                println!("Chart: {} {:?}", plan.category, plan.mappings);
            }
            RenderOutcome::Empty { message } => {
                println!("Chart: none ({message})");
            }
        }
        println!();
    }

    Ok(())
}
