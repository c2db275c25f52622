//! WebSocket endpoint bridging connections onto the room router.
//!
//! Authentication happens before the upgrade: the client passes its JWT as a
//! `token` query parameter and a bad token is rejected with 401 instead of a
//! doomed upgrade. After the upgrade the socket splits into an outbound pump
//! (room events out as JSON text frames) and an inbound loop (client
//! messages in).
//!
//! Room joins are re-validated server-side: a join is honored only if the
//! authenticated user is the project's owner or a member at join time.
//! Client-supplied project ids are never trusted on their own.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::backend::auth::sessions;
use crate::backend::error::ApiError;
use crate::backend::realtime::rooms::{project_room, ConnectionId};
use crate::backend::server::AppState;
use crate::backend::store;
use crate::shared::event::ClientMessage;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    token: String,
}

/// GET /ws?token=...
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Response {
    let user_id = match sessions::user_id_from_token(&params.token) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: Uuid) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let connection = state.rooms.register(user_id, tx);
    tracing::debug!(%user_id, "realtime connection opened");

    // Outbound pump: room events become JSON text frames. Ends when the
    // router drops the sender or the peer goes away.
    let outbound = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    tracing::error!(error = %err, "failed to encode board event");
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(_) => break,
        };
        match frame {
            Message::Text(text) => {
                match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(message) => {
                        handle_message(&state, connection, user_id, message).await;
                    }
                    Err(err) => {
                        tracing::warn!(%user_id, error = %err, "unparseable realtime message");
                    }
                }
            }
            Message::Close(_) => break,
            // Pings are answered by axum; binary frames are not part of
            // the protocol.
            _ => {}
        }
    }

    state.rooms.unregister(connection);
    outbound.abort();
    tracing::debug!(%user_id, "realtime connection closed");
}

async fn handle_message(
    state: &AppState,
    connection: ConnectionId,
    user_id: Uuid,
    message: ClientMessage,
) {
    match message {
        ClientMessage::JoinProject { project_id } => {
            match membership_check(state, user_id, project_id).await {
                Ok(()) => {
                    state.rooms.join(connection, &project_room(project_id));
                    tracing::debug!(%user_id, %project_id, "joined project room");
                }
                Err(err) => {
                    tracing::warn!(%user_id, %project_id, error = %err, "room join refused");
                }
            }
        }
        ClientMessage::LeaveProject { project_id } => {
            state.rooms.leave(connection, &project_room(project_id));
        }
        other => {
            let Some(event) = other.into_board_event() else {
                return;
            };
            let room = project_room(event.project_id());
            // Only connections that passed the join check may publish into
            // a room.
            if !state.rooms.is_in_room(connection, &room) {
                tracing::warn!(%user_id, room, "broadcast from non-member dropped");
                return;
            }
            let delivered = state.rooms.broadcast(&room, &event);
            tracing::debug!(room, delivered, "board event rebroadcast");
        }
    }
}

/// The join-time authorization gate.
async fn membership_check(
    state: &AppState,
    user_id: Uuid,
    project_id: Uuid,
) -> Result<(), ApiError> {
    let project = store::projects::get_project(&state.pool, project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("project not found"))?;
    if !project.is_member(user_id) {
        return Err(ApiError::forbidden("not a member of this project"));
    }
    Ok(())
}
