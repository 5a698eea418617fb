//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::router::CommandRouter;
use crate::game::{ArenaError, PlayerId};
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::util::time::unix_millis;
use crate::ws::protocol::ServerMsg;
use crate::ws::registry::{ConnectionRegistry, Frame};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// `C` followed by five uppercase hex digits
pub fn new_connection_id() -> PlayerId {
    let uuid = Uuid::new_v4().simple().to_string();
    PlayerId::new(format!("C{}", uuid[..5].to_uppercase()))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (id, outbound_rx) = loop {
        let id = new_connection_id();
        if let Some(rx) = state.registry.register(id.clone()) {
            break (id, rx);
        }
    };
    info!(player_id = %id, "New WebSocket connection");

    let (mut ws_sink, ws_stream) = socket.split();

    state.registry.send_to(&id, &ServerMsg::Welcome { id: id.clone() });

    let joined = match state.arena.join(id.clone()).await {
        Ok(player) => {
            info!(player_id = %id, color = ?player.color, players = state.arena.player_count(), "Player joined");
            announce_arrival(&state.registry, &id);
            run_session(&id, ws_sink, ws_stream, outbound_rx, &state).await;
            if let Err(e) = state.arena.leave(id.clone()).await {
                debug!(player_id = %id, error = %e, "Leave not delivered");
            }
            true
        }
        Err(e) => {
            warn!(player_id = %id, error = %e, "Refusing connection");
            let refusal = ServerMsg::Error { message: e.to_string() };
            if let Err(e) = send_msg(&mut ws_sink, &refusal).await {
                debug!(player_id = %id, error = %e, "Failed to send refusal");
            }
            let _ = ws_sink.send(Message::Close(None)).await;
            false
        }
    };

    state.registry.unregister(&id);
    // Peers only heard of players that made it into the arena
    if joined {
        state.registry.broadcast(&ServerMsg::Disconnected { from: id.clone() });
    }

    info!(player_id = %id, "WebSocket connection closed");
}

/// Tell every connection, the new one included, that a player arrived
fn announce_arrival(registry: &ConnectionRegistry, id: &PlayerId) {
    registry.broadcast(&ServerMsg::NewClient { id: id.clone() });
}

/// Run the WebSocket session with read/write split
async fn run_session(
    id: &PlayerId,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    mut outbound_rx: mpsc::Receiver<Frame>,
    state: &AppState,
) {
    let rate_limiter = ConnectionRateLimiter::default();

    // Writer task: registry queue -> WebSocket
    let writer_id = id.clone();
    let writer_handle = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if let Err(e) = ws_sink.send(Message::Text(frame.to_string())).await {
                debug!(player_id = %writer_id, error = %e, "WebSocket send failed");
                break;
            }
        }
        let _ = ws_sink.close().await;
    });

    // Reader loop: WebSocket -> arena
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check() {
                    warn!(player_id = %id, "Rate limited input message");
                    continue;
                }

                let Some(command) = CommandRouter::decode(&text) else {
                    continue;
                };

                match state.arena.command(id.clone(), command, unix_millis()).await {
                    Ok(()) => {}
                    Err(ArenaError::Closed) => {
                        debug!(player_id = %id, "Arena closed");
                        break;
                    }
                    Err(e) => {
                        debug!(player_id = %id, error = %e, "Command not delivered");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                debug!(player_id = %id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(player_id = %id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(player_id = %id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json)).await.map_err(|e| e.to_string())
}
