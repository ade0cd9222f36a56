//! Product list fan-out
//!
//! Mutating use cases push the full product list through this seam after
//! every successful write. The real-time layer provides the implementation.

use tokio::sync::Mutex;

use crate::domain::entity::Product;

pub trait ProductBroadcaster: Send + Sync + 'static {
    /// Called with the complete, current product list
    fn products_changed(&self, products: Vec<Product>);

    /// Held across the re-read and the publish so snapshots leave in the
    /// order they were read.
    fn publish_order(&self) -> &Mutex<()>;
}

/// Broadcaster that drops every update
#[derive(Debug, Default)]
pub struct NoopBroadcaster {
    order: Mutex<()>,
}

impl ProductBroadcaster for NoopBroadcaster {
    fn products_changed(&self, _products: Vec<Product>) {}

    fn publish_order(&self) -> &Mutex<()> {
        &self.order
    }
}
