//! Axum route handlers for alert analysis and free-form generation.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::analysis::{parse_model_output, ParsedResult};
use crate::errors::AppError;
use crate::prompts::language::DEFAULT_LANG;
use crate::prompts::render::render;
use crate::prompts::store::PromptError;
use crate::prompts::ALERT_TEMPLATE_NAME;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateTextRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateTextResponse {
    pub generated_text: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeAlertRequest {
    pub alert_data: Map<String, Value>,
    #[serde(default)]
    pub language_iso_code: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct AnalyzeAlertResponse {
    pub success: bool,
    pub analysis: Option<ParsedResult>,
    pub raw: Option<String>,
    pub language: Option<String>,
    pub error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /generate-text
///
/// Sends the prompt to the model as-is and returns the raw reply.
pub async fn handle_generate_text(
    State(state): State<AppState>,
    Json(request): Json<GenerateTextRequest>,
) -> Result<Json<GenerateTextResponse>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    let response = match state.llm.generate(&request.prompt).await {
        Ok(generated_text) => GenerateTextResponse {
            generated_text,
            success: true,
            error: None,
        },
        Err(e) => {
            warn!("Text generation failed: {e}");
            GenerateTextResponse {
                generated_text: String::new(),
                success: false,
                error: Some(e.to_string()),
            }
        }
    };

    Ok(Json(response))
}

/// POST /analyze-alert
///
/// Renders the alert-analysis template with the alert, asks the model for a
/// JSON analysis, and returns the extracted, deduplicated object. Model and
/// parse failures come back as `success: false` with the raw text attached.
pub async fn handle_analyze_alert(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeAlertRequest>,
) -> Result<Json<AnalyzeAlertResponse>, AppError> {
    let language = request
        .language_iso_code
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LANG.to_string());

    let template = match state.prompts.load(ALERT_TEMPLATE_NAME).await {
        Ok(template) if !template.trim().is_empty() => template,
        Ok(_) | Err(PromptError::NotFound(_)) => {
            warn!("Alert analysis template '{ALERT_TEMPLATE_NAME}' is missing or empty");
            return Ok(Json(AnalyzeAlertResponse {
                error: Some("Prompt template missing".to_string()),
                ..Default::default()
            }));
        }
        Err(e) => return Err(e.into()),
    };

    let mut variables = Map::new();
    variables.insert("alert_data".to_string(), Value::Object(request.alert_data));
    variables.insert(
        "language_iso_code".to_string(),
        Value::String(language.clone()),
    );
    let prompt = render(&template, &variables)?;

    let raw = match state.llm.generate(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Alert analysis generation failed: {e}");
            return Ok(Json(AnalyzeAlertResponse {
                error: Some(e.to_string()),
                raw: Some(String::new()),
                language: Some(language),
                ..Default::default()
            }));
        }
    };
    debug!("Model analysis output: {raw:?}");

    let response = match parse_model_output(&raw) {
        Ok(analysis) => AnalyzeAlertResponse {
            success: true,
            analysis: Some(analysis),
            language: Some(language),
            ..Default::default()
        },
        Err(e) => {
            warn!("Model output not valid JSON: {e}");
            AnalyzeAlertResponse {
                error: Some(format!("Model output not valid JSON: {e}")),
                raw: Some(raw),
                language: Some(language),
                ..Default::default()
            }
        }
    };

    Ok(Json(response))
}
