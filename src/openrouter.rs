use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    config::Config,
    error::{prefix_chars, GenerationError},
    models::{ModelInfo, ModelPricing, PromptPair},
    validation::validate_model,
};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 2000;
const DEFAULT_CONTEXT_LENGTH: u64 = 4096;
const LOG_PREVIEW_CHARS: usize = 300;

/// The upstream chat-completion service as seen by the HTTP handlers.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Whether credentials are present; checked before any request work.
    fn is_configured(&self) -> bool;

    /// Send the prompt pair and return the raw completion text.
    async fn complete(&self, model: &str, prompts: &PromptPair) -> Result<String, GenerationError>;

    async fn list_models(&self) -> Result<Vec<ModelInfo>, GenerationError>;
}

pub struct OpenRouterClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    site_url: String,
    app_name: String,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: [ChatMessage<'a>; 2],
    pub temperature: f32,
    pub max_tokens: u32,
}

impl<'a> ChatRequest<'a> {
    pub fn new(model: &'a str, prompts: &'a PromptPair) -> Self {
        Self {
            model,
            messages: [
                ChatMessage { role: "system", content: &prompts.system_prompt },
                ChatMessage { role: "user", content: &prompts.user_prompt },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

impl OpenRouterClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_base.clone(),
            site_url: config.site_url.clone(),
            app_name: config.app_name.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        Ok(request
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.app_name))
    }

    async fn read_body(response: reqwest::Response) -> (u16, bool, String) {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        (status.as_u16(), status.is_success(), body)
    }
}

#[async_trait]
impl ChatBackend for OpenRouterClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, model: &str, prompts: &PromptPair) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        info!("🔗 Making request to: {} (model {})", url, model);

        let request = self.authorize(self.client.post(&url))?.json(&ChatRequest::new(model, prompts));
        let response = request.send().await.map_err(|e| {
            error!("❌ OpenRouter request failed: {}", e);
            GenerationError::Transport(e.to_string())
        })?;

        let (status, ok, body) = Self::read_body(response).await;
        info!("📥 Response status: {}", status);
        if !ok {
            error!("❌ API Error response: {}", prefix_chars(&body, LOG_PREVIEW_CHARS));
            return Err(GenerationError::upstream_status(status, &body));
        }
        info!("📥 Raw completion response: {}", prefix_chars(&body, LOG_PREVIEW_CHARS));
        completion_content(status, &body)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, GenerationError> {
        let url = format!("{}/models", self.base_url);
        info!("🔗 Fetching model list from: {}", url);

        let response = self.authorize(self.client.get(&url))?.send().await.map_err(|e| {
            error!("❌ OpenRouter model list request failed: {}", e);
            GenerationError::Transport(e.to_string())
        })?;

        let (status, ok, body) = Self::read_body(response).await;
        if !ok {
            error!("❌ Model list error response ({}): {}", status, prefix_chars(&body, LOG_PREVIEW_CHARS));
            return Err(GenerationError::upstream_status(status, &body));
        }
        let models = models_from_body(&body);
        info!("✅ {} models available", models.len());
        Ok(models)
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<serde_json::Value>,
}

/// Pull `choices[0].message.content` out of a successful response body.
pub fn completion_content(status: u16, body: &str) -> Result<String, GenerationError> {
    let parsed: Option<ChatResponse> = serde_json::from_str(body).ok();
    let content = parsed
        .and_then(|r| r.choices.into_iter().next())
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .and_then(|v| match v {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        });
    content.ok_or_else(|| {
        warn!("⚠️ No string content in completion response");
        GenerationError::missing_content(status, body)
    })
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    context_length: Option<serde_json::Value>,
    #[serde(default)]
    pricing: Option<RawPricing>,
}

#[derive(Debug, Deserialize, Default)]
struct RawPricing {
    #[serde(default)]
    prompt: Option<Price>,
    #[serde(default)]
    completion: Option<Price>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Price {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Price {
    fn value(price: Option<Price>) -> f64 {
        match price {
            Some(Price::Number(n)) => n,
            Some(Price::Text(s)) => s.trim().parse().unwrap_or(0.0),
            Some(Price::Other(_)) | None => 0.0,
        }
    }
}

fn normalize_model(raw: RawModel) -> ModelInfo {
    let context_length = match raw.context_length {
        Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => DEFAULT_CONTEXT_LENGTH,
    };
    let pricing = raw.pricing.unwrap_or_default();
    ModelInfo {
        name: raw.name.filter(|n| !n.is_empty()).unwrap_or_else(|| raw.id.clone()),
        id: raw.id,
        context_length,
        pricing: ModelPricing { prompt: Price::value(pricing.prompt), completion: Price::value(pricing.completion) },
    }
}

/// Normalize and validate an upstream `/models` body, dropping bad entries.
pub fn models_from_body(body: &str) -> Vec<ModelInfo> {
    let Ok(parsed) = serde_json::from_str::<ModelsResponse>(body) else {
        warn!("⚠️ Model list body was not the expected shape");
        return Vec::new();
    };
    parsed
        .data
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<RawModel>(entry) {
            Ok(raw) => Some(normalize_model(raw)),
            Err(e) => {
                warn!("⚠️ Skipping malformed model entry: {}", e);
                None
            }
        })
        .filter(|model| match validate_model(model) {
            Ok(()) => true,
            Err(failure) => {
                warn!(model = %model.id, "⚠️ Model failed validation: {}", failure.first_message());
                false
            }
        })
        .collect()
}
