pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::alerts::handlers as alerts;
use crate::prompts::handlers as prompts;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/hello", get(health::hello_handler))
        .route("/health", get(health::health_handler))
        // Alert analysis
        .route("/generate-text", post(alerts::handle_generate_text))
        .route("/analyze-alert", post(alerts::handle_analyze_alert))
        // Prompt templates
        .route("/prompts", get(prompts::handle_list_prompts))
        .route("/prompts/:name", get(prompts::handle_get_prompt))
        .route("/prompts/:name/render", post(prompts::handle_render_prompt))
        .route("/prompts/:name/run", post(prompts::handle_run_prompt))
        .route(
            "/admin/prompts/reload",
            post(prompts::handle_reload_prompts),
        )
        .with_state(state)
}
