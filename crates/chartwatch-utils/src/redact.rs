//! Secret redaction for log output

use regex::Regex;
use std::sync::LazyLock;

static SENSITIVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Perplexity
        r"pplx-[a-zA-Z0-9]+",
        // Anthropic
        r"sk-ant-[a-zA-Z0-9\-_]+",
        // OpenAI (after Anthropic so the longer prefix wins)
        r"sk-[a-zA-Z0-9\-_]{16,}",
        // xAI
        r"xai-[a-zA-Z0-9]+",
        // Google
        r"AIza[a-zA-Z0-9\-_]+",
        r#"(?i)password["']?\s*[:=]\s*["']?[^"'\s]+"#,
        r#"(?i)api[_-]?key["']?\s*[:=]\s*["']?[^"'\s]+"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("redaction pattern is valid"))
    .collect()
});

/// Replace API keys and passwords in `text` with `[REDACTED]`
pub fn sanitize_for_logging(text: &str) -> String {
    let mut sanitized = text.to_string();
    for pattern in SENSITIVE_PATTERNS.iter() {
        sanitized = pattern.replace_all(&sanitized, "[REDACTED]").into_owned();
    }
    sanitized
}
