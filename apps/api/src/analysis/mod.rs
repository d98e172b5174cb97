// Model output post-processing: pull the JSON object out of the reply,
// then collapse repeated entries in its list fields.
// Pure functions only; no I/O happens here.

pub mod dedup;
pub mod extract;

pub use dedup::dedupe;
pub use extract::{extract, ExtractionError, ParsedResult};

/// Extracts the analysis object from raw model text and deduplicates it.
pub fn parse_model_output(raw: &str) -> Result<ParsedResult, ExtractionError> {
    extract(raw).map(dedupe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_end_to_end_fenced_reply_with_prose() {
        let raw = "Here is the result:\n```json\n{\"keyPoints\": [\"a\", \"a\", \"b\"], \"summary\": \"ok\"}\n```";

        let extracted = extract(raw).unwrap();
        assert_eq!(
            Value::Object(extracted.clone()),
            json!({"keyPoints": ["a", "a", "b"], "summary": "ok"})
        );

        assert_eq!(
            Value::Object(dedupe(extracted)),
            json!({"keyPoints": ["a", "b"], "summary": "ok"})
        );
    }

    #[test]
    fn test_parse_model_output_propagates_extraction_error() {
        assert_eq!(parse_model_output("  "), Err(ExtractionError::EmptyInput));
    }

    #[test]
    fn test_parse_model_output_full_analysis() {
        let raw = r#"```json
{
  "summary": "Trojan detected on Windows host",
  "keyPoints": ["Trojan.Generic.Test quarantined", "Trojan.Generic.Test quarantined"],
  "recommendations": [
    {"action": "Isolate host", "priority": "high"},
    {"priority": "high", "action": "Isolate host"},
    {"action": "Rotate credentials", "priority": "medium"}
  ],
  "mitreInfo": [{"technique": "T1204", "tactic": "Execution"}],
  "knownBreaches": []
}
```"#;
        let parsed = parse_model_output(raw).unwrap();
        assert_eq!(parsed["keyPoints"].as_array().unwrap().len(), 1);
        assert_eq!(
            parsed["recommendations"],
            json!([
                {"action": "Isolate host", "priority": "high"},
                {"action": "Rotate credentials", "priority": "medium"}
            ])
        );
        assert_eq!(parsed["summary"], json!("Trojan detected on Windows host"));
    }
}
