use serde::Serialize;
use serde_json::Value;

/// Output bounds (§4.4): tool results handed to the LLM are truncated to
/// 50,000 characters; the UI-facing preview is truncated to 500.
pub const MAX_TOOL_RESULT_CHARS: usize = 50_000;
pub const MAX_OUTPUT_PREVIEW_CHARS: usize = 500;

/// The structured value the dispatcher returns for consumption by the LLM
/// (§4.4, GLOSSARY "Tool result").
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
    pub metadata: Option<Value>,
    pub requires_approval: bool,
    pub pending_command: Option<String>,
}

impl ToolResult {
    #[must_use]
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: truncate(&output.into(), MAX_TOOL_RESULT_CHARS),
            error: None,
            metadata: None,
            requires_approval: false,
            pending_command: None,
        }
    }

    #[must_use]
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
            metadata: None,
            requires_approval: false,
            pending_command: None,
        }
    }

    #[must_use]
    pub fn needs_approval(pending_command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(message.into()),
            metadata: None,
            requires_approval: true,
            pending_command: Some(pending_command.into()),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Truncated preview for the UI stream (§4.4).
    #[must_use]
    pub fn output_preview(&self) -> String {
        truncate(&self.output, MAX_OUTPUT_PREVIEW_CHARS)
    }
}

/// Truncates `s` to at most `max_chars` characters, respecting char
/// boundaries.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_leaves_short_strings_untouched() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_caps_long_strings() {
        let long = "a".repeat(60_000);
        assert_eq!(truncate(&long, MAX_TOOL_RESULT_CHARS).len(), MAX_TOOL_RESULT_CHARS);
    }

    #[test]
    fn output_preview_is_capped_separately_from_full_output() {
        let result = ToolResult::ok("x".repeat(1000));
        assert_eq!(result.output_preview().len(), MAX_OUTPUT_PREVIEW_CHARS);
        assert_eq!(result.output.len(), 1000);
    }
}
