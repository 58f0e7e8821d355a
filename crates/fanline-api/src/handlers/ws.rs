//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::decode_token;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: String,
}

/// GET /ws?token={jwt}
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    // Authenticate before upgrading; a bad token never reaches the engine.
    let claims = decode_token(&query.token, &state.auth).map_err(ApiError)?;
    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, claims.sub, socket)))
}

async fn handle_ws_connection(state: AppState, user_id: Uuid, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.engine.connect(user_id).await;
    let conn_id = handle.id;
    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection established");

    // Outbound forwarder: engine events become text frames.
    let outbound_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "Dropping unserializable event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                state.engine.handle_text(conn_id, &text).await;
            }
            Ok(Message::Close(_)) => break,
            // Protocol-level ping/pong is answered by the transport.
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.engine.disconnect(conn_id).await;
    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection closed");
}
