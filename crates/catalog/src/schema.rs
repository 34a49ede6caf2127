use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFamily {
    Filesystem,
    System,
    Docker,
    WebServer,
    Backup,
    GitHub,
}

impl ToolFamily {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ToolFamily::Filesystem => "filesystem",
            ToolFamily::System => "system",
            ToolFamily::Docker => "docker",
            ToolFamily::WebServer => "web_server",
            ToolFamily::Backup => "backup",
            ToolFamily::GitHub => "github",
        }
    }
}

/// A single catalog entry (§4.3): name, description, JSON-Schema-shaped
/// input schema, family (which executor the dispatcher routes to), and
/// whether the handler is intrinsically dangerous regardless of the regex
/// classifier.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub family: ToolFamily,
    pub intrinsically_dangerous: bool,
}
