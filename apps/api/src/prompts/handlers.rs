//! Axum route handlers for the prompt template API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::analysis::parse_model_output;
use crate::errors::AppError;
use crate::prompts::language::normalize_lang;
use crate::prompts::render::render;
use crate::prompts::store::{sanitize_name, PromptError};
use crate::state::AppState;

const LANGUAGE_VARIABLE: &str = "outputLanguageCode";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PromptContentResponse {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct RenderPromptRequest {
    #[serde(default)]
    pub variables: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct RenderPromptResponse {
    pub name: String,
    pub rendered: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPromptRequest {
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default = "default_parse_json")]
    pub parse_json: bool,
    #[serde(default)]
    pub output_language_code: Option<String>,
}

fn default_parse_json() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPromptQuery {
    pub output_language_code: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct RunPromptResponse {
    pub success: bool,
    pub rendered: Option<String>,
    /// Parsed object when `parseJson` succeeded, otherwise the raw text.
    pub output: Option<Value>,
    pub raw: Option<String>,
    pub error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /prompts
pub async fn handle_list_prompts(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.prompts.list().await?))
}

/// GET /prompts/:name
pub async fn handle_get_prompt(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PromptContentResponse>, AppError> {
    let content = state.prompts.load(&name).await?;
    Ok(Json(PromptContentResponse {
        name,
        content: content.to_string(),
    }))
}

/// POST /prompts/:name/render
///
/// Renders the template with the given variables without calling the model.
pub async fn handle_render_prompt(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<RenderPromptRequest>,
) -> Result<Json<RenderPromptResponse>, AppError> {
    let template = state.prompts.load(&name).await?;
    let rendered = render(&template, &request.variables)?;
    Ok(Json(RenderPromptResponse { name, rendered }))
}

/// POST /prompts/:name/run
///
/// Renders the template, calls the model, records the run in the output log
/// and (by default) returns the extracted, deduplicated JSON object.
///
/// Output language precedence: query parameter, then body field, then
/// `variables.outputLanguageCode`, then English.
pub async fn handle_run_prompt(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<RunPromptQuery>,
    Json(request): Json<RunPromptRequest>,
) -> Result<Json<RunPromptResponse>, AppError> {
    let template = match state.prompts.load(&name).await {
        Ok(template) => template,
        Err(PromptError::NotFound(_)) => {
            return Ok(Json(RunPromptResponse {
                error: Some("Prompt not found".to_string()),
                ..Default::default()
            }));
        }
        Err(e) => return Err(e.into()),
    };

    let mut variables = request.variables;
    let requested = non_empty(query.output_language_code)
        .or_else(|| non_empty(request.output_language_code))
        .or_else(|| {
            variables
                .get(LANGUAGE_VARIABLE)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        });
    let language = normalize_lang(requested.as_deref());
    variables.insert(LANGUAGE_VARIABLE.to_string(), Value::String(language));

    let rendered = render(&template, &variables)?;
    let generated = state.llm.generate(&rendered).await;

    let text = generated.as_deref().unwrap_or_default();
    match state
        .output_log
        .save(text, &sanitize_name(&name), generated.is_ok(), &rendered)
        .await
    {
        Ok(path) => info!("Model output saved to {}", path.display()),
        Err(e) => warn!("Failed to save model output: {e:#}"),
    }

    let text = match generated {
        Ok(text) => text,
        Err(e) => {
            warn!("Prompt '{name}' generation failed: {e}");
            return Ok(Json(RunPromptResponse {
                rendered: Some(rendered),
                output: Some(Value::String(String::new())),
                raw: request.parse_json.then(String::new),
                error: Some(e.to_string()),
                ..Default::default()
            }));
        }
    };

    if !request.parse_json {
        return Ok(Json(RunPromptResponse {
            success: true,
            rendered: Some(rendered),
            output: Some(Value::String(text)),
            ..Default::default()
        }));
    }

    let response = match parse_model_output(&text) {
        Ok(parsed) => RunPromptResponse {
            success: true,
            rendered: Some(rendered),
            output: Some(Value::Object(parsed)),
            raw: Some(text),
            error: None,
        },
        Err(e) => RunPromptResponse {
            success: false,
            rendered: Some(rendered),
            output: Some(Value::String(text.clone())),
            raw: Some(text),
            error: Some(format!("Parse error Prompt: {e}")),
        },
    };

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct ReloadQuery {
    pub name: Option<String>,
}

/// POST /admin/prompts/reload[?name=<template>]
///
/// Drops cached template text so edits on disk are picked up: one template
/// when `name` is given, otherwise all of them.
pub async fn handle_reload_prompts(
    State(state): State<AppState>,
    Query(query): Query<ReloadQuery>,
) -> StatusCode {
    match non_empty(query.name) {
        Some(name) => {
            state.prompts.invalidate(&name).await;
            info!("Prompt template '{name}' evicted from cache");
        }
        None => {
            state.prompts.clear().await;
            info!("Prompt template cache cleared");
        }
    }
    StatusCode::NO_CONTENT
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
