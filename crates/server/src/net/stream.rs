//! WebSocket subscription stream.
//!
//! The session is resolved before the upgrade, so an unknown id or a bad
//! viewport fails the request itself rather than an already-open socket.
//! Each frame goes out as one binary message (see [`Frame::encode`]).

use std::borrow::Cow;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};

use super::api::{ApiError, SubscribeQuery};
use crate::session::SessionStore;
use crate::subscription::{Frame, Subscription};

pub async fn subscribe(
    State(store): State<Arc<SessionStore>>,
    Path(id): Path<String>,
    query: Result<Query<SubscribeQuery>, QueryRejection>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let viewport = query.viewport();
    store.check_subscription(&id, &viewport).inspect_err(|e| {
        tracing::warn!("Rejected subscription to {}: {}", id, e);
    })?;
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };
    let subscription = store.subscribe(&id, viewport)?;
    Ok(ws.on_upgrade(move |socket| push_frames(socket, subscription)))
}

/// Push frames until the client goes away or the session closes.
async fn push_frames(mut socket: WebSocket, mut subscription: Subscription) {
    let session_id = subscription.session_id();

    loop {
        tokio::select! {
            frame = subscription.next_frame() => {
                let Some(frame) = frame else {
                    let _ = socket.send(session_closed()).await;
                    break;
                };
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }

            // Drain client messages; only close/EOF matter.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Subscriber stream for session {} ended", session_id);
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), axum::Error> {
    socket.send(Message::Binary(frame.encode().into())).await
}

fn session_closed() -> Message {
    Message::Close(Some(CloseFrame {
        code: close_code::AWAY,
        reason: Cow::Borrowed("session closed"),
    }))
}
