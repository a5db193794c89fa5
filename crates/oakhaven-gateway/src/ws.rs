//! `WebSocket` handlers for player and spectator connections (§4.13).
//!
//! A single upgrade route serves both modes: a `token` query parameter
//! (or, failing that, a first `auth` message) binds the connection to a
//! resident; a `spectate` query parameter instead opens a read-only,
//! unauthenticated feed with inbound messages ignored.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use oakhaven_types::enums::LifecycleStatus;
use oakhaven_types::ids::ResidentId;
use oakhaven_types::protocol::{ClientMessage, ErrorMessage, ServerMessage, SystemAnnouncement, WelcomeMessage};
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::verify_session_token;
use crate::state::{GatewayCommand, GatewayState, Recipient};

/// How long to wait for a first `auth` message when no `token` query
/// parameter was supplied before giving up on the handshake.
const AUTH_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameters accepted on the `/ws` upgrade route.
#[derive(Debug, Default, serde::Deserialize)]
pub struct WsQuery {
    /// A signed session token, for player connections.
    pub token: Option<String>,
    /// The resident id to spectate, for read-only connections.
    pub spectate: Option<Uuid>,
}

/// Upgrade an HTTP request to a player or spectator `WebSocket`
/// connection, chosen by which query parameter is present.
///
/// # Route
///
/// `GET /ws?token=...` or `GET /ws?spectate=<resident-id>`
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    if let Some(target) = query.spectate {
        return ws.on_upgrade(move |socket| handle_spectator(socket, state, ResidentId::from(target)));
    }
    ws.on_upgrade(move |socket| handle_player(socket, state, query.token))
}

async fn handle_player(mut socket: WebSocket, state: Arc<GatewayState>, token: Option<String>) {
    let token = match token {
        Some(token) => token,
        None => match await_auth_message(&mut socket).await {
            Some(token) => token,
            None => {
                close_with_error(&mut socket, "auth_timeout", "no auth message received").await;
                return;
            }
        },
    };

    let claims = match verify_session_token(&state.session_secret, &token) {
        Ok(claims) => claims,
        Err(err) => {
            close_with_error(&mut socket, "invalid_token", &err.to_string()).await;
            return;
        }
    };

    let (status, world_seconds) = {
        let snapshot = state.snapshot.read().await;
        (snapshot.residents.get(&claims.resident_id).map(|r| r.status), snapshot.world_seconds)
    };

    match status {
        None => {
            close_with_error(&mut socket, "unknown_resident", "resident not found").await;
            return;
        }
        Some(LifecycleStatus::Deceased) => {
            close_with_error(&mut socket, "resident_deceased", "resident is deceased").await;
            return;
        }
        Some(LifecycleStatus::Processed | LifecycleStatus::Departed) => {
            close_with_error(&mut socket, "resident_unavailable", "resident is no longer in the colony").await;
            return;
        }
        Some(LifecycleStatus::Alive) => {}
    }

    let welcome = ServerMessage::Welcome(WelcomeMessage { resident_id: claims.resident_id, map_url: state.map_url.clone(), world_seconds });
    if send_message(&mut socket, &welcome).await.is_err() {
        return;
    }
    let announcement = ServerMessage::SystemAnnouncement(SystemAnnouncement {
        title: "Oakhaven colony engine".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    });
    if send_message(&mut socket, &announcement).await.is_err() {
        return;
    }

    debug!(resident_id = %claims.resident_id, "player connected");
    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                match outbound {
                    Ok(envelope) => {
                        if matches!(envelope.recipient, Recipient::Resident(id) if id == claims.resident_id)
                            && send_message(&mut socket, &envelope.message).await.is_err()
                        {
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, resident_id = %claims.resident_id, "player connection lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => handle_player_text(&text, claims.resident_id, &state).await,
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(resident_id = %claims.resident_id, "player disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(%err, "websocket error");
                        return;
                    }
                }
            }
        }
    }
}

async fn handle_player_text(text: &str, resident_id: ResidentId, state: &Arc<GatewayState>) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Action(envelope)) => {
            let command = GatewayCommand::Action { resident_id, envelope };
            if state.commands.send(command).await.is_err() {
                warn!("gateway command channel closed; dropping action");
            }
        }
        Ok(ClientMessage::Auth(_)) => {
            debug!(resident_id = %resident_id, "ignoring redundant auth message");
        }
        Err(err) => warn!(%err, "malformed client message"),
    }
}

async fn handle_spectator(mut socket: WebSocket, state: Arc<GatewayState>, target: ResidentId) {
    let exists = state.snapshot.read().await.residents.contains_key(&target);
    if !exists {
        close_with_error(&mut socket, "unknown_resident", "spectate target not found").await;
        return;
    }

    debug!(target = %target, "spectator connected");
    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                match outbound {
                    Ok(envelope) => {
                        if matches!(envelope.recipient, Recipient::Spectators)
                            && send_message(&mut socket, &envelope.message).await.is_err()
                        {
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, target = %target, "spectator connection lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(target = %target, "spectator disconnected");
                        return;
                    }
                    Some(Err(err)) => {
                        debug!(%err, "websocket error");
                        return;
                    }
                    // Spectator connections are read-only; every other
                    // inbound frame (including text) is ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

async fn await_auth_message(socket: &mut WebSocket) -> Option<String> {
    let message = timeout(AUTH_HANDSHAKE_TIMEOUT, socket.recv()).await.ok()??;
    let Ok(Message::Text(text)) = message else {
        return None;
    };
    match serde_json::from_str::<ClientMessage>(&text) {
        Ok(ClientMessage::Auth(auth)) => Some(auth.token),
        _ => None,
    }
}

async fn send_message(socket: &mut WebSocket, message: &ServerMessage) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(err) => {
            warn!(%err, "failed to serialize outbound message");
            return Ok(());
        }
    };
    socket.send(Message::Text(json.into())).await
}

async fn close_with_error(socket: &mut WebSocket, code: &str, message: &str) {
    let error = ServerMessage::Error(ErrorMessage { code: code.to_owned(), message: message.to_owned() });
    let _ = send_message(socket, &error).await;
    let _ = socket.send(Message::Close(Some(CloseFrame { code: close_code::POLICY, reason: message.to_owned().into() }))).await;
}
