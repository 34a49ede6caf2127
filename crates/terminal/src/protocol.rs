//! WebSocket JSON frame shapes for `/ws/terminal` (§4.7).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Connect { server_id: String, user_id: String, cols: u32, rows: u32 },
    Input { data: String },
    Resize { cols: u32, rows: u32 },
    Suggest { partial: String },
    AiHelp { question: String },
    Disconnect,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Connected { session_id: String, message: String },
    Output { data: String },
    Disconnected { message: String },
    Error { message: String },
    Suggestions { suggestions: Vec<String>, source: SuggestionSource },
    AiResponse { response: String },
    Resized { cols: u32, rows: u32 },
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Local,
    Ai,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_frame_parses_from_discriminated_json() {
        let json = r#"{"type":"connect","server_id":"s1","user_id":"u1","cols":80,"rows":24}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        assert!(matches!(frame, ClientFrame::Connect { cols: 80, rows: 24, .. }));
    }

    #[test]
    fn server_frame_serializes_with_type_tag() {
        let frame = ServerFrame::Output { data: "hi".into() };
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"type\":\"output\""));
        assert!(json.contains("\"data\":\"hi\""));
    }

    #[test]
    fn disconnect_frame_has_no_payload() {
        let frame: ClientFrame = serde_json::from_str(r#"{"type":"disconnect"}"#).unwrap();
        assert!(matches!(frame, ClientFrame::Disconnect));
    }
}
