use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::output_log::OutputLog;
use crate::prompts::store::PromptStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Model backend. Production: `VertexClient`.
    pub llm: Arc<dyn TextGenerator>,
    pub prompts: Arc<PromptStore>,
    pub output_log: OutputLog,
}
