use axum::{Json, Router, extract::State, routing::{get, post}};
use bytes::Bytes;
use serde_json::{Map, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::{
    error::GenerationError,
    extract::extract,
    models::{GenerationInput, GenerationResult, ModelInfo},
    openrouter::ChatBackend,
    prompt::build_prompts,
    validation::validate_generation_request,
};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ChatBackend>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/openrouter/generate", post(generate_svg))
        .route("/api/openrouter/models", get(list_models))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

pub async fn generate_svg(State(state): State<AppState>, body: Bytes) -> Result<Json<GenerationResult>, GenerationError> {
    if !state.backend.is_configured() {
        return Err(GenerationError::MissingApiKey);
    }

    // An unparseable body is validated as `{}` so the caller gets field-level issues.
    let value: Value = serde_json::from_slice(&body).unwrap_or_else(|_| Value::Object(Map::new()));
    let input = validate_generation_request(&value).map_err(|failure| {
        info!("🚫 Rejected generation request: {}", failure.first_message());
        GenerationError::InvalidInput(failure)
    })?;

    let span = info_span!("generate", request_id = %Uuid::new_v4(), model = %input.model_id);
    run_generation(state.backend.as_ref(), &input).instrument(span).await.map(Json)
}

/// One generation attempt: prompts, a single upstream call, then extraction.
pub async fn run_generation(backend: &dyn ChatBackend, input: &GenerationInput) -> Result<GenerationResult, GenerationError> {
    let prompts = build_prompts(input);
    info!(
        icon = %input.source_icon_name,
        preset = input.style_preset.as_deref().unwrap_or("none"),
        color = %input.style_parameters.primary_color,
        outline_width = input.style_parameters.outline_width,
        explicit_system_prompt = input.system_prompt_override().is_some(),
        "🎯 Generating SVG variant"
    );

    let raw = backend.complete(&input.model_id, &prompts).await?;
    let result = extract(&raw)?;

    info!("✅ Generated SVG ({} chars, explanation {} chars)", result.svg.len(), result.explanation.len());
    Ok(result)
}

pub async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelInfo>>, GenerationError> {
    if !state.backend.is_configured() {
        return Err(GenerationError::MissingApiKey);
    }
    state.backend.list_models().await.map(Json)
}
