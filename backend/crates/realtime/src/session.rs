//! Per-socket event handling
//!
//! A session turns one client event into the replies owed to that socket.
//! Anything meant for every socket goes through the hub instead.

use catalog::domain::entity::Product;
use catalog::domain::repository::{CartRepository, ProductRepository};
use catalog::domain::value_object::Quantity;
use catalog::{ManageCartsUseCase, ManageProductsUseCase, ProductBroadcaster};
use std::sync::Arc;

use crate::chat::{ChatLog, ChatMessage};
use crate::config::RealtimeConfig;
use crate::error::{RealtimeError, RealtimeResult};
use crate::event::{AddToCart, ClientEvent, ServerEvent};
use crate::hub::RealtimeHub;

/// Shared state for socket handlers
pub struct RealtimeState<P, C>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    pub hub: Arc<RealtimeHub>,
    pub chat: Arc<ChatLog>,
    pub products: Arc<P>,
    pub carts: Arc<C>,
    pub config: Arc<RealtimeConfig>,
}

impl<P, C> Clone for RealtimeState<P, C>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            hub: self.hub.clone(),
            chat: self.chat.clone(),
            products: self.products.clone(),
            carts: self.carts.clone(),
            config: self.config.clone(),
        }
    }
}

pub struct Session<P, C>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    state: RealtimeState<P, C>,
    user: Option<String>,
}

impl<P, C> Session<P, C>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    pub fn new(state: RealtimeState<P, C>) -> Self {
        Self { state, user: None }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Decode and handle one text frame
    pub async fn handle_text(&mut self, text: &str) -> Vec<ServerEvent> {
        match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => self.handle(event).await,
            Err(e) => {
                let err = RealtimeError::from(e);
                err.log();
                vec![ServerEvent::Error(err.client_message())]
            }
        }
    }

    pub async fn handle(&mut self, event: ClientEvent) -> Vec<ServerEvent> {
        match self.dispatch(event).await {
            Ok(replies) => replies,
            Err(err) => {
                err.log();
                vec![ServerEvent::Error(err.client_message())]
            }
        }
    }

    async fn dispatch(&mut self, event: ClientEvent) -> RealtimeResult<Vec<ServerEvent>> {
        match event {
            ClientEvent::RegisterUser(name) => {
                let name = name.trim();
                self.user = (!name.is_empty()).then(|| name.to_string());
                tracing::info!(user = ?self.user, "Chat user registered");

                Ok(vec![ServerEvent::MessageList(self.state.chat.snapshot().await)])
            }
            ClientEvent::NewMessage(message) => {
                let text = message.into_text();
                if text.trim().is_empty() {
                    return Err(RealtimeError::EmptyMessage);
                }

                let user = self
                    .user
                    .clone()
                    .unwrap_or_else(|| self.state.config.anonymous_name.clone());
                let hub = &self.state.hub;
                self.state
                    .chat
                    .append_with(ChatMessage { user, text }, |log| {
                        hub.publish(&ServerEvent::MessageList(log.to_vec()))
                    })
                    .await;

                Ok(Vec::new())
            }
            ClientEvent::GetProducts => {
                let products = self.products().list_all().await?;
                Ok(vec![ServerEvent::UpdateProducts(products)])
            }
            ClientEvent::AddProduct(draft) => {
                let product: Product = self.products().create(draft).await?;
                Ok(vec![ServerEvent::ProductAdded(format!(
                    "Producto \"{}\" agregado exitosamente",
                    product.title
                ))])
            }
            ClientEvent::DeleteProduct(id) => {
                self.products().delete(&id).await?;
                Ok(vec![ServerEvent::ProductDeleted(
                    "Producto eliminado exitosamente".to_string(),
                )])
            }
            ClientEvent::AddToCart(AddToCart {
                cart_id,
                product_id,
                quantity,
            }) => {
                let cart = self
                    .carts()
                    .add_product(&cart_id, &product_id, Quantity::or_one(quantity))
                    .await?;
                self.state.hub.publish(&ServerEvent::CartUpdated(cart));

                Ok(Vec::new())
            }
        }
    }

    /// Product writes broadcast the full list through the hub
    fn products(&self) -> ManageProductsUseCase<P> {
        let broadcaster: Arc<dyn ProductBroadcaster> = self.state.hub.clone();
        ManageProductsUseCase::new(self.state.products.clone(), broadcaster)
    }

    fn carts(&self) -> ManageCartsUseCase<C, P> {
        ManageCartsUseCase::new(self.state.carts.clone(), self.state.products.clone())
    }
}
