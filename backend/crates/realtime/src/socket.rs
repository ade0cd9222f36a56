//! WebSocket transport

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use catalog::domain::repository::{CartRepository, ProductRepository};
use tokio::sync::broadcast::error::RecvError;

use crate::event::ServerEvent;
use crate::hub::encode;
use crate::session::{RealtimeState, Session};

/// GET /ws
pub async fn ws_handler<P, C>(
    ws: WebSocketUpgrade,
    State(state): State<RealtimeState<P, C>>,
) -> Response
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    ws.on_upgrade(move |socket| run_socket(socket, state))
}

async fn run_socket<P, C>(mut socket: WebSocket, state: RealtimeState<P, C>)
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let mut broadcasts = state.hub.subscribe();
    let mut session = Session::new(state);
    tracing::info!("Socket connected");

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let replies = session.handle_text(text.as_str()).await;
                    if send_all(&mut socket, &replies).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Pings are answered by axum; binary frames are not part of the protocol
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "Socket receive failed");
                    break;
                }
            },
            outgoing = broadcasts.recv() => match outgoing {
                Ok(frame) => {
                    if socket.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Socket lagging, skipped broadcast events");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    tracing::info!(user = ?session.user(), "Socket disconnected");
}

async fn send_all(socket: &mut WebSocket, events: &[ServerEvent]) -> Result<(), axum::Error> {
    for event in events {
        match encode(event) {
            Ok(frame) => socket.send(Message::Text(frame)).await?,
            Err(e) => tracing::error!(error = %e, event = event.name(), "Failed to encode reply"),
        }
    }
    Ok(())
}
