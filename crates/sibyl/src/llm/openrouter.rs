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

//! OpenAI-compatible chat-completions client for OpenRouter, the provider
//! the escalation path defaults to. Configured from the environment.

use crate::llm::core::CompletionAdapter;
use async_trait::async_trait;
use llm_contracts::{CompletionRequest, CompletionResponse, LLMError, LLMResult, Message, Usage};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "qwen/qwen3-vl-235b-a22b-instruct";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct OpenRouterAdapter {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    timeout: Duration,
    max_retries: u32,
}

impl OpenRouterAdapter {
    pub fn new(api_key: String, endpoint: Option<String>, model: Option<String>) -> LLMResult<Self> {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LLMError::Configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Builds the adapter from `OPENROUTER_API_KEY`, `OPENROUTER_API_URL`
    /// and `MODEL_NAME`. A missing key is a configuration error the caller
    /// may treat as "run without escalation".
    pub fn from_env() -> LLMResult<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY").map_err(|_| {
            LLMError::Configuration("OPENROUTER_API_KEY is not set".to_string())
        })?;
        let adapter = Self::new(
            api_key,
            std::env::var("OPENROUTER_API_URL").ok(),
            std::env::var("MODEL_NAME").ok(),
        )?;
        info!(
            "OpenRouter adapter configured for model '{}'",
            adapter.model
        );
        Ok(adapter)
    }

    fn build_payload(&self, request: &CompletionRequest) -> Value {
        let mut messages = Vec::new();
        if let Some(system_prompt) = &request.system_prompt {
            messages.push(Message {
                role: "system".to_string(),
                content: system_prompt.clone(),
            });
        }
        messages.push(Message {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        let mut payload = json!({
            "model": self.model,
            "messages": messages,
        });
        let config = &request.generation_config;
        if let Some(max_tokens) = config.max_tokens {
            payload["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = config.temperature {
            payload["temperature"] = json!(temperature);
        }
        if let Some(top_p) = config.top_p {
            payload["top_p"] = json!(top_p);
        }
        if let Some(stop) = &config.stop_sequences {
            payload["stop"] = json!(stop);
        }
        payload
    }

    fn parse_response(
        &self,
        request_id: Uuid,
        response_data: Value,
    ) -> LLMResult<CompletionResponse> {
        let content = response_data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                LLMError::Provider("Failed to extract content from completion response".to_string())
            })?;
        let usage = response_data.get("usage").map_or_else(Usage::default, |u| Usage {
            prompt_tokens: u["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            completion_tokens: u["completion_tokens"].as_u64().unwrap_or(0) as u32,
            total_tokens: u["total_tokens"].as_u64().unwrap_or(0) as u32,
        });
        let mut response = CompletionResponse::from_content(request_id, content);
        response.model_used = self.model.clone();
        response.usage = usage;
        Ok(response)
    }

    async fn execute_with_retry(&self, payload: Value) -> LLMResult<Value> {
        let mut last_error = None;
        for attempt in 0..self.max_retries {
            match tokio::time::timeout(
                self.timeout,
                self.client
                    .post(&self.endpoint)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .header("Content-Type", "application/json")
                    .json(&payload)
                    .send(),
            )
            .await
            {
                Ok(Ok(response)) => match response.status() {
                    status if status.is_success() => {
                        return response.json().await.map_err(|e| {
                            LLMError::Serialisation(format!("Failed to parse response: {e}"))
                        });
                    }
                    status => {
                        last_error = Some(LLMError::Provider(format!(
                            "OpenRouter API error {}: {}",
                            status,
                            response
                                .text()
                                .await
                                .unwrap_or_else(|_| "Unknown error".to_string())
                        )));
                        if status.is_client_error() && status != 429 {
                            break;
                        }
                    }
                },
                Ok(Err(e)) => {
                    last_error = Some(LLMError::Network(format!("Request failed: {e}")));
                    if attempt < self.max_retries {
                        let wait_time = Duration::from_secs(2_u64.pow(attempt.min(3)));
                        tokio::time::sleep(wait_time).await;
                    }
                }
                Err(_) => {
                    last_error = Some(LLMError::Timeout);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| LLMError::Internal("Unknown error".to_string())))
    }
}

#[async_trait]
impl CompletionAdapter for OpenRouterAdapter {
    async fn complete(&self, request: CompletionRequest) -> LLMResult<CompletionResponse> {
        let payload = self.build_payload(&request);
        let response_data = self.execute_with_retry(payload).await.inspect_err(|e| {
            warn!("OpenRouter request {} failed: {e}", request.id);
        })?;
        self.parse_response(request.id, response_data)
    }

    async fn health_check(&self) -> LLMResult<()> {
        if self.api_key.is_empty() {
            return Err(LLMError::Authentication("Empty API key".to_string()));
        }
        Ok(())
    }
}
