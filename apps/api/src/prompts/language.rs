/// Output languages the prompts are written to support.
pub const SUPPORTED_LANG_CODES: &[&str] = &["en", "es", "fr", "de", "it", "pt", "ja", "ko", "zh", "pl"];

pub const DEFAULT_LANG: &str = "en";

/// Maps a requested language code onto a supported one, falling back to English.
pub fn normalize_lang(code: Option<&str>) -> String {
    let Some(code) = code.map(|c| c.trim().to_lowercase()).filter(|c| !c.is_empty()) else {
        return DEFAULT_LANG.to_string();
    };
    if code.starts_with("eng") {
        return DEFAULT_LANG.to_string();
    }
    if SUPPORTED_LANG_CODES.contains(&code.as_str()) {
        code
    } else {
        DEFAULT_LANG.to_string()
    }
}
