//! Broadcast hub
//!
//! One `tokio::sync::broadcast` channel shared by every socket. Events are
//! encoded once and fanned out as ready-to-send text frames.

use axum::extract::ws::Utf8Bytes;
use catalog::ProductBroadcaster;
use catalog::domain::entity::Product;
use tokio::sync::{Mutex, broadcast};

use crate::event::ServerEvent;

pub fn encode(event: &ServerEvent) -> Result<Utf8Bytes, serde_json::Error> {
    serde_json::to_string(event).map(Utf8Bytes::from)
}

#[derive(Debug)]
pub struct RealtimeHub {
    tx: broadcast::Sender<Utf8Bytes>,
    product_order: Mutex<()>,
}

impl RealtimeHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            product_order: Mutex::new(()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Utf8Bytes> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Send to every connected socket
    pub fn publish(&self, event: &ServerEvent) {
        let frame = match encode(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, event = event.name(), "Failed to encode event");
                return;
            }
        };

        match self.tx.send(frame) {
            Ok(receivers) => {
                tracing::debug!(event = event.name(), receivers, "Event broadcast");
            }
            Err(_) => {
                tracing::trace!(event = event.name(), "No connected sockets");
            }
        }
    }
}

impl ProductBroadcaster for RealtimeHub {
    fn products_changed(&self, products: Vec<Product>) {
        self.publish(&ServerEvent::UpdateProducts(products));
    }

    fn publish_order(&self) -> &Mutex<()> {
        &self.product_order
    }
}
