//! LLM provider abstraction.
//!
//! Supports OpenAI-compatible (GPT-4o-mini) and Anthropic (Claude Haiku) APIs.
//! Uses blocking HTTP via `ureq`: one query is processed start to finish, so
//! there is no async runtime. Calls are never retried here.

use serde_json::Value;
use std::time::Duration;

/// Errors from LLM provider calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("response parse error: {0}")]
    Parse(String),
    #[error("empty response from LLM")]
    EmptyResponse,
    #[error("LLM response did not call tool '{0}'")]
    MissingToolCall(String),
    #[error("unknown provider: '{name}'. Available: {available}")]
    UnknownProvider { name: String, available: String },
}

/// A completed free-text response.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The text content of the response.
    pub text: String,
    /// Input tokens used (from API response, if reported).
    pub input_tokens: Option<u64>,
    /// Output tokens used (from API response, if reported).
    pub output_tokens: Option<u64>,
}

/// A completed schema-constrained response: the tool arguments the model produced.
#[derive(Debug, Clone)]
pub struct StructuredResponse {
    pub payload: Value,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

/// A single tool the model is forced to call, with a JSON schema for its arguments.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Request limits shared by every provider.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSettings {
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Abstraction over LLM API providers.
pub trait LlmProvider: Send {
    /// Send a completion request with system and user messages.
    fn complete(&self, system: &str, user: &str) -> Result<LlmResponse, ProviderError>;

    /// Send a request that must be answered by calling `tool`; returns its arguments.
    fn complete_structured(
        &self,
        system: &str,
        user: &str,
        tool: &ToolSpec,
    ) -> Result<StructuredResponse, ProviderError>;

    /// The model name (for display/logging).
    fn model_name(&self) -> &str;

    /// Cost per million input tokens (USD).
    fn cost_per_mtok_input(&self) -> f64;

    /// Cost per million output tokens (USD).
    fn cost_per_mtok_output(&self) -> f64;
}

fn http_agent(settings: ProviderSettings) -> ureq::Agent {
    ureq::Agent::new_with_config(
        ureq::config::Config::builder()
            .timeout_global(Some(settings.timeout))
            .http_status_as_error(false)
            .build(),
    )
}

fn map_ureq_error(err: ureq::Error) -> ProviderError {
    ProviderError::Http(err.to_string())
}

fn read_body(response: &mut ureq::http::Response<ureq::Body>) -> Result<Value, ProviderError> {
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ProviderError::Http(e.to_string()))?;
    parse_api_body(status, &body)
}

/// Decode a response body, turning non-2xx statuses and `{"error": {...}}`
/// bodies into [`ProviderError::Api`] with the service's own message.
pub fn parse_api_body(status: u16, body: &str) -> Result<Value, ProviderError> {
    let json = serde_json::from_str::<Value>(body);

    if !(200..300).contains(&status) {
        let message = json
            .ok()
            .as_ref()
            .and_then(api_error_message)
            .unwrap_or_else(|| match body.trim() {
                "" => "unknown error".to_string(),
                text => text.to_string(),
            });
        return Err(ProviderError::Api { status, message });
    }

    let json = json.map_err(|e| ProviderError::Parse(e.to_string()))?;
    if let Some(err) = json.get("error") {
        return Err(ProviderError::Api {
            status,
            message: err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string(),
        });
    }
    Ok(json)
}

fn api_error_message(json: &Value) -> Option<String> {
    json.pointer("/error/message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

fn usage_field(json: &Value, key: &str) -> Option<u64> {
    json.get("usage")
        .and_then(|u| u.get(key))
        .and_then(|t| t.as_u64())
}

// ---------------------------------------------------------------------------
// Anthropic Messages API
// ---------------------------------------------------------------------------

/// Anthropic provider using the Messages API.
#[cfg(feature = "anthropic")]
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    settings: ProviderSettings,
    agent: ureq::Agent,
}

#[cfg(feature = "anthropic")]
impl AnthropicProvider {
    /// Default model: Claude Haiku 4.5, fast and cheap.
    pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
    const API_URL: &str = "https://api.anthropic.com/v1/messages";

    pub fn new(api_key: String, model: Option<String>, settings: ProviderSettings) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            settings,
            agent: http_agent(settings),
        }
    }

    fn post(&self, body: &Value) -> Result<Value, ProviderError> {
        let mut response = self
            .agent
            .post(Self::API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .send_json(body)
            .map_err(map_ureq_error)?;

        read_body(&mut response)
    }
}

/// Extract the first text block of a Messages API response.
pub fn anthropic_text(json: &Value) -> Result<String, ProviderError> {
    json.get("content")
        .and_then(|c| c.as_array())
        .and_then(|arr| {
            arr.iter()
                .find_map(|block| block.get("text").and_then(|t| t.as_str()))
        })
        .map(str::to_string)
        .ok_or(ProviderError::EmptyResponse)
}

/// Extract the `input` of the `tool_use` block calling `tool_name`.
pub fn anthropic_tool_input(json: &Value, tool_name: &str) -> Result<Value, ProviderError> {
    json.get("content")
        .and_then(|c| c.as_array())
        .and_then(|arr| {
            arr.iter().find(|block| {
                block.get("type").and_then(|t| t.as_str()) == Some("tool_use")
                    && block.get("name").and_then(|n| n.as_str()) == Some(tool_name)
            })
        })
        .and_then(|block| block.get("input"))
        .cloned()
        .ok_or_else(|| ProviderError::MissingToolCall(tool_name.to_string()))
}

#[cfg(feature = "anthropic")]
impl LlmProvider for AnthropicProvider {
    fn complete(&self, system: &str, user: &str) -> Result<LlmResponse, ProviderError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.settings.max_tokens,
            "system": system,
            "messages": [
                {"role": "user", "content": user}
            ]
        });

        let json = self.post(&body)?;
        Ok(LlmResponse {
            text: anthropic_text(&json)?,
            input_tokens: usage_field(&json, "input_tokens"),
            output_tokens: usage_field(&json, "output_tokens"),
        })
    }

    fn complete_structured(
        &self,
        system: &str,
        user: &str,
        tool: &ToolSpec,
    ) -> Result<StructuredResponse, ProviderError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.settings.max_tokens,
            "system": system,
            "messages": [
                {"role": "user", "content": user}
            ],
            "tools": [{
                "name": tool.name,
                "description": tool.description,
                "input_schema": tool.parameters,
            }],
            "tool_choice": {"type": "tool", "name": tool.name}
        });

        let json = self.post(&body)?;
        Ok(StructuredResponse {
            payload: anthropic_tool_input(&json, &tool.name)?,
            input_tokens: usage_field(&json, "input_tokens"),
            output_tokens: usage_field(&json, "output_tokens"),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn cost_per_mtok_input(&self) -> f64 {
        // Haiku 4.5: $0.80/MTok input
        if self.model.contains("haiku") {
            0.80
        } else if self.model.contains("sonnet") {
            3.00
        } else {
            1.00 // conservative default
        }
    }

    fn cost_per_mtok_output(&self) -> f64 {
        // Haiku 4.5: $4.00/MTok output
        if self.model.contains("haiku") {
            4.00
        } else if self.model.contains("sonnet") {
            15.00
        } else {
            5.00
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI Chat Completions API
// ---------------------------------------------------------------------------

/// OpenAI-compatible provider (works with OpenAI, Azure, local proxies).
#[cfg(feature = "openai")]
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    settings: ProviderSettings,
    agent: ureq::Agent,
}

#[cfg(feature = "openai")]
impl OpenAiProvider {
    /// Default model: GPT-4o-mini, fast and cheap.
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    const DEFAULT_BASE_URL: &str = "https://api.openai.com";

    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        settings: ProviderSettings,
    ) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            settings,
            agent: http_agent(settings),
        }
    }

    fn post(&self, body: &Value) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .send_json(body)
            .map_err(map_ureq_error)?;

        read_body(&mut response)
    }

    fn messages(system: &str, user: &str) -> Value {
        serde_json::json!([
            {"role": "system", "content": system},
            {"role": "user", "content": user}
        ])
    }
}

fn openai_message(json: &Value) -> Option<&Value> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
}

/// Extract the assistant text of a chat completion.
pub fn openai_text(json: &Value) -> Result<String, ProviderError> {
    openai_message(json)
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or(ProviderError::EmptyResponse)
}

/// Decode the arguments of the first tool call to `tool_name`.
pub fn openai_tool_arguments(json: &Value, tool_name: &str) -> Result<Value, ProviderError> {
    let arguments = openai_message(json)
        .and_then(|msg| msg.get("tool_calls"))
        .and_then(|calls| calls.as_array())
        .and_then(|calls| {
            calls.iter().find(|call| {
                call.pointer("/function/name").and_then(|n| n.as_str()) == Some(tool_name)
            })
        })
        .and_then(|call| call.pointer("/function/arguments"))
        .and_then(|args| args.as_str())
        .ok_or_else(|| ProviderError::MissingToolCall(tool_name.to_string()))?;

    serde_json::from_str(arguments).map_err(|e| ProviderError::Parse(e.to_string()))
}

#[cfg(feature = "openai")]
impl LlmProvider for OpenAiProvider {
    fn complete(&self, system: &str, user: &str) -> Result<LlmResponse, ProviderError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.settings.max_tokens,
            "messages": Self::messages(system, user),
        });

        let json = self.post(&body)?;
        Ok(LlmResponse {
            text: openai_text(&json)?,
            input_tokens: usage_field(&json, "prompt_tokens"),
            output_tokens: usage_field(&json, "completion_tokens"),
        })
    }

    fn complete_structured(
        &self,
        system: &str,
        user: &str,
        tool: &ToolSpec,
    ) -> Result<StructuredResponse, ProviderError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.settings.max_tokens,
            "messages": Self::messages(system, user),
            "tools": [{
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters,
                }
            }],
            "tool_choice": {"type": "function", "function": {"name": tool.name}}
        });

        let json = self.post(&body)?;
        Ok(StructuredResponse {
            payload: openai_tool_arguments(&json, &tool.name)?,
            input_tokens: usage_field(&json, "prompt_tokens"),
            output_tokens: usage_field(&json, "completion_tokens"),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn cost_per_mtok_input(&self) -> f64 {
        // GPT-4o-mini: $0.15/MTok input
        if self.model.contains("4o-mini") {
            0.15
        } else if self.model.contains("4o") {
            2.50
        } else {
            0.50
        }
    }

    fn cost_per_mtok_output(&self) -> f64 {
        // GPT-4o-mini: $0.60/MTok output
        if self.model.contains("4o-mini") {
            0.60
        } else if self.model.contains("4o") {
            10.00
        } else {
            1.50
        }
    }
}

/// Create a provider from CLI/config settings.
#[allow(unused_variables)]
pub fn create_provider(
    provider_name: &str,
    api_key: &str,
    model: Option<&str>,
    base_url: Option<&str>,
    settings: ProviderSettings,
) -> Result<Box<dyn LlmProvider>, ProviderError> {
    match provider_name {
        #[cfg(feature = "anthropic")]
        "anthropic" => Ok(Box::new(AnthropicProvider::new(
            api_key.to_string(),
            model.map(String::from),
            settings,
        ))),
        #[cfg(feature = "openai")]
        "openai" => Ok(Box::new(OpenAiProvider::new(
            api_key.to_string(),
            model.map(String::from),
            base_url.map(String::from),
            settings,
        ))),
        other => Err(ProviderError::UnknownProvider {
            name: other.to_string(),
            available: available_providers().join(", "),
        }),
    }
}

/// List compiled-in provider names.
pub fn available_providers() -> Vec<&'static str> {
    vec![
        #[cfg(feature = "anthropic")]
        "anthropic",
        #[cfg(feature = "openai")]
        "openai",
    ]
}
