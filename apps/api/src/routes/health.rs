use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

const SERVICE_NAME: &str = "Trellix WISE REST API";

/// GET /
/// Service banner with the endpoint map.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": SERVICE_NAME,
        "description": "Cybersecurity alert analysis",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "analyze_alert_rest": "/analyze-alert",
            "generate_text": "/generate-text",
            "hello": "/hello",
            "list_prompts": "/prompts",
            "get_prompt": "/prompts/{name}",
            "render_prompt": "/prompts/{name}/render",
            "run_prompt": "/prompts/{name}/run",
            "reload_prompts": "/admin/prompts/reload"
        }
    }))
}

/// GET /hello
pub async fn hello_handler() -> Json<Value> {
    Json(json!({ "message": format!("Hello from {SERVICE_NAME}") }))
}

/// GET /health
/// Returns service status and the Vertex AI target.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "vertex_ai_project": state.config.project_id.as_deref().unwrap_or("Not configured"),
        "vertex_ai_location": state.config.location,
    }))
}
