//! HTTP-backed [`Oracle`] implementation against an OpenAI-compatible
//! chat-completions endpoint (OpenAI itself, and any self-hosted gateway
//! that speaks the same wire format).
//!
//! Structured output is requested via `response_format: {type:
//! "json_schema", ...}` and the response is re-validated locally with
//! `jsonschema` before being handed back -- providers are not always
//! strict about enforcing the schema they were given.

use crate::config::{OracleConfig, WorkerKind};
use crate::error::{OracleError, Result};
use crate::oracle::Oracle;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone)]
pub struct HttpOracle {
    config: OracleConfig,
    client: Client,
}

impl HttpOracle {
    pub fn new(config: OracleConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build oracle HTTP client");
        Self { config, client }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    schema: Value,
    strict: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl Oracle for HttpOracle {
    #[tracing::instrument(skip(self, system_prompt, user_prompt, output_schema), fields(worker = ?worker))]
    async fn structured_call(
        &self,
        worker: WorkerKind,
        system_prompt: &str,
        user_prompt: &str,
        output_schema: &Value,
    ) -> Result<Value> {
        let settings = self.config.resolve(worker);

        let body = ChatRequest {
            model: settings.model,
            messages: vec![
                ChatMessage { role: "system", content: system_prompt.to_string() },
                ChatMessage { role: "user", content: user_prompt.to_string() },
            ],
            temperature: settings.temperature,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "oracle_output",
                    schema: output_schema.clone(),
                    strict: true,
                },
            },
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => OracleError::Authentication(text),
                429 => OracleError::RateLimited(text),
                _ => OracleError::Provider(format!("{status}: {text}")),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| OracleError::InvalidResponse(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| OracleError::InvalidResponse("no choices in response".to_string()))?;

        let value: Value = serde_json::from_str(&content)?;
        validate_schema(&value, output_schema)?;
        Ok(value)
    }
}

fn validate_schema(value: &Value, schema: &Value) -> Result<()> {
    let compiled = jsonschema::validator_for(schema)
        .map_err(|e| OracleError::SchemaViolation(e.to_string()))?;
    if let Err(err) = compiled.validate(value) {
        return Err(OracleError::SchemaViolation(err.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction_does_not_panic() {
        let config = OracleConfig::new("https://api.openai.com/v1", "test-key", "gpt-4o-mini");
        let _oracle = HttpOracle::new(config);
    }
}
