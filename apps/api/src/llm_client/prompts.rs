// Cross-cutting prompt fragments applied to every model call.

/// Appended to every prompt sent to the model.
pub const JSON_ONLY_SUFFIX: &str = "\n\nIMPORTANT: Return your response as valid JSON only.";

/// Attaches the JSON-only instruction to a rendered prompt.
pub fn with_json_instruction(prompt: &str) -> String {
    format!("{prompt}{JSON_ONLY_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_instruction_is_appended() {
        let prompt = with_json_instruction("Analyze this alert.");
        assert!(prompt.starts_with("Analyze this alert."));
        assert!(prompt.ends_with("Return your response as valid JSON only."));
    }
}
