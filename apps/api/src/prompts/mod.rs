// Prompt templates: discovery, loading, rendering and language selection.

pub mod handlers;
pub mod language;
pub mod render;
pub mod store;

/// Template used by the alert-analysis endpoint.
pub const ALERT_TEMPLATE_NAME: &str = "alert_analysis_prompt";
