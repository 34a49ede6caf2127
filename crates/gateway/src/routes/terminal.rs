//! `WS /ws/terminal` (§4.7, §6): JSON-framed WebSocket bridging a browser
//! terminal to a PTY-backed SSH shell.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use vps_ssh::{Credential, ServerConnection};
use vps_store::types::AuthMethod;
use vps_terminal::{ClientFrame, ServerFrame, SuggestionSource};

use crate::llm_factory::resolve_provider;
use crate::state::AppState;

pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerFrame>(64);

    let write_handle = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            let Ok(text) = serde_json::to_string(&frame) else { continue };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut session_id: Option<String> = None;
    let mut user_id: Option<String> = None;

    while let Some(Ok(message)) = ws_rx.next().await {
        let Message::Text(text) = message else {
            if matches!(message, Message::Close(_)) {
                break;
            }
            continue;
        };

        let frame: ClientFrame = match serde_json::from_str(&text) {
            Ok(frame) => frame,
            Err(e) => {
                let _ = out_tx.send(ServerFrame::Error { message: format!("malformed frame: {e}") }).await;
                continue;
            }
        };

        match frame {
            ClientFrame::Connect { server_id, user_id: uid, cols, rows } => {
                user_id = Some(uid.clone());
                match connect_session(&state, &server_id, cols, rows, out_tx.clone()).await {
                    Ok(id) => {
                        session_id = Some(id.clone());
                        let _ = out_tx
                            .send(ServerFrame::Connected { session_id: id, message: "connected".to_string() })
                            .await;
                    }
                    Err(e) => {
                        let _ = out_tx.send(ServerFrame::Error { message: e }).await;
                    }
                }
            }
            ClientFrame::Input { data } => {
                if let Some(id) = &session_id {
                    state.terminal.input(id, data.as_bytes()).await;
                }
            }
            ClientFrame::Resize { cols, rows } => {
                if let Some(id) = &session_id {
                    state.terminal.resize(id, cols, rows).await;
                }
            }
            ClientFrame::Suggest { partial } => {
                let locals = vps_terminal::suggest::local_suggestions(&partial);
                let _ = out_tx
                    .send(ServerFrame::Suggestions { suggestions: locals, source: SuggestionSource::Local })
                    .await;

                if vps_terminal::suggest::should_ask_ai(&partial) {
                    if let Some(uid) = &user_id {
                        if let Ok(provider) = resolve_provider(&state, uid, "claude-sonnet").await {
                            let ai = vps_terminal::suggest::ai_suggestions(&provider, &partial).await;
                            let _ = out_tx
                                .send(ServerFrame::Suggestions { suggestions: ai, source: SuggestionSource::Ai })
                                .await;
                        }
                    }
                }
            }
            ClientFrame::AiHelp { question } => {
                if let Some(uid) = &user_id {
                    if let Ok(provider) = resolve_provider(&state, uid, "claude-sonnet").await {
                        let response = vps_terminal::suggest::ai_help(&provider, &question).await;
                        let _ = out_tx.send(ServerFrame::AiResponse { response }).await;
                    }
                }
            }
            ClientFrame::Disconnect => {
                if let Some(id) = session_id.take() {
                    state.terminal.disconnect(&id).await;
                }
                let _ = out_tx.send(ServerFrame::Disconnected { message: "client requested disconnect".to_string() }).await;
                break;
            }
        }
    }

    if let Some(id) = session_id {
        state.terminal.disconnect(&id).await;
    }
    drop(out_tx);
    let _ = write_handle.await;
}

async fn connect_session(state: &AppState, server_id: &str, cols: u32, rows: u32, out_tx: mpsc::Sender<ServerFrame>) -> Result<String, String> {
    let server = state
        .store
        .get_server(server_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("no such server: {server_id}"))?;

    let plaintext = state.vault.decrypt_credential(&server.encrypted_credential).map_err(|e| e.to_string())?;
    let credential = match server.auth_method {
        AuthMethod::Password => Credential::Password(plaintext),
        AuthMethod::Key => Credential::PrivateKey { key: plaintext, passphrase: None },
    };
    let conn = ServerConnection::new(server.host, server.port, server.username, credential);

    state.terminal.connect(&conn, cols, rows, out_tx).await.map_err(|e| e.to_string())
}
