use crate::{API_KEY_VAR, DEFAULT_API_BASE};
use alchemist_config::{LlmConfig, RetryConfig};
use alchemist_core::error::ApiError;
use alchemist_core::http::{self, read_json, transport_error};
use alchemist_core::models::{ChatCompletion, ChatRequest, TokenUsage};
use alchemist_core::retry::RetryPolicy;
use alchemist_core::traits::ChatModel;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

const SERVICE: &str = "OpenAI";

/// OpenAI chat completions
#[derive(Clone)]
pub struct OpenAiChat {
    model: String,
    api_key: String,
    api_base: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl OpenAiChat {
    pub fn new(
        model: String,
        api_key: String,
        api_base: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            model,
            api_key,
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            client: http::client(timeout_secs)?,
            retry: RetryPolicy::none(),
        })
    }

    pub fn from_config(config: &LlmConfig, retry: &RetryConfig) -> Result<Self> {
        let chat = Self::new(
            config.model.clone(),
            http::api_key(API_KEY_VAR)?,
            config.api_base.clone(),
            config.timeout_secs,
        )?;
        Ok(chat.with_retry(RetryPolicy::from(retry)))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn chat_inner(&self, body: &Value) -> Result<ChatCompletion> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let res = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        let json = read_json(SERVICE, res).await?;
        parse_completion(json, &self.model)
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let body = chat_request_body(&self.model, request);
        debug!(model = %self.model, messages = request.messages.len(), "chat completion");
        self.retry
            .run("chat completion", || self.chat_inner(&body))
            .await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// gpt-5 models fix temperature at 1.0 and take `max_completion_tokens`
pub fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
}

pub fn chat_request_body(model: &str, request: &ChatRequest) -> Value {
    let mut body = serde_json::json!({
        "model": model,
        "messages": request.messages,
    });

    if is_reasoning_model(model) {
        if let Some(limit) = request.max_tokens {
            body["max_completion_tokens"] = serde_json::json!(limit);
        }
    } else {
        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(limit) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(limit);
        }
    }
    body
}

pub fn parse_completion(json: Value, requested_model: &str) -> Result<ChatCompletion> {
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| ApiError::malformed(SERVICE, "missing content in choices"))?;

    let usage = &json["usage"];
    let count = |field: &str| usage[field].as_u64().unwrap_or(0) as u32;

    Ok(ChatCompletion {
        content,
        model: json["model"]
            .as_str()
            .unwrap_or(requested_model)
            .to_string(),
        usage: TokenUsage {
            prompt_tokens: count("prompt_tokens"),
            completion_tokens: count("completion_tokens"),
            total_tokens: count("total_tokens"),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alchemist_core::prompt::Message;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![Message::system("be brief"), Message::user("hi")],
            temperature: Some(0.5),
            max_tokens: Some(256),
        }
    }

    #[test]
    fn test_gpt5_body_omits_temperature() {
        let body = chat_request_body("gpt-5", &request());
        assert_eq!(body["max_completion_tokens"], 256);
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
    }

    #[test]
    fn test_classic_body_keeps_sampling_params() {
        let body = chat_request_body("gpt-4o", &request());
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["max_tokens"], 256);
        assert!(body.get("max_completion_tokens").is_none());
    }

    #[test]
    fn test_unbounded_request() {
        let body = chat_request_body("gpt-5-mini", &ChatRequest::new(vec![Message::user("hi")]));
        assert_eq!(
            body,
            json!({
                "model": "gpt-5-mini",
                "messages": [{ "role": "user", "content": "hi" }],
            })
        );
    }

    #[test]
    fn test_parse_completion() {
        let json = json!({
            "model": "gpt-5-2025-08-07",
            "choices": [{ "message": { "role": "assistant", "content": "Answer [Source 1]." } }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128 },
        });
        let completion = parse_completion(json, "gpt-5").unwrap();
        assert_eq!(completion.content, "Answer [Source 1].");
        assert_eq!(completion.model, "gpt-5-2025-08-07");
        assert_eq!(
            completion.usage,
            TokenUsage {
                prompt_tokens: 120,
                completion_tokens: 8,
                total_tokens: 128
            }
        );
    }

    #[test]
    fn test_parse_missing_content() {
        let err = parse_completion(json!({ "choices": [] }), "gpt-5").unwrap_err();
        assert!(err.to_string().contains("missing content"));
    }
}
