//! Real-time Router

use axum::{Router, routing::get};
use catalog::domain::repository::{CartRepository, ProductRepository};
use std::sync::Arc;

use crate::chat::ChatLog;
use crate::config::RealtimeConfig;
use crate::hub::RealtimeHub;
use crate::session::RealtimeState;
use crate::socket;

/// `GET /ws`
///
/// `hub` must be the same instance handed to the catalog router as its
/// product broadcaster, so HTTP writes reach connected sockets.
pub fn realtime_router<P, C>(
    products: Arc<P>,
    carts: Arc<C>,
    hub: Arc<RealtimeHub>,
    chat: Arc<ChatLog>,
    config: RealtimeConfig,
) -> Router
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let state = RealtimeState {
        hub,
        chat,
        products,
        carts,
        config: Arc::new(config),
    };

    Router::new()
        .route("/ws", get(socket::ws_handler::<P, C>))
        .with_state(state)
}
