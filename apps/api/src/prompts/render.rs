//! Jinja rendering for prompt templates.
//!
//! Templates get the request variables as their top-level context. Undefined
//! variables render as an empty string; syntax and evaluation errors are
//! reported as `PromptError::Render`.

use std::sync::LazyLock;

use minijinja::Environment;
use serde_json::{Map, Value};

use crate::prompts::store::PromptError;

static ENV: LazyLock<Environment<'static>> = LazyLock::new(Environment::new);

pub fn render(template: &str, variables: &Map<String, Value>) -> Result<String, PromptError> {
    ENV.render_str(template, variables)
        .map_err(|e| PromptError::Render(e.to_string()))
}
