//! Socket event envelopes
//!
//! Every text frame is `{"event": <name>, "data": <payload>}`.

use catalog::domain::entity::{CartDetail, Product, ProductDraft};
use kernel::id::{CartId, ProductId};
use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;

/// Chat text as an object `{text}` or a bare string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NewMessage {
    Object { text: String },
    Text(String),
}

impl NewMessage {
    pub fn into_text(self) -> String {
        match self {
            NewMessage::Object { text } | NewMessage::Text(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub cart_id: CartId,
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Client to server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    RegisterUser(String),
    NewMessage(NewMessage),
    GetProducts,
    AddProduct(ProductDraft),
    DeleteProduct(ProductId),
    AddToCart(AddToCart),
}

/// Server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    MessageList(Vec<ChatMessage>),
    UpdateProducts(Vec<Product>),
    ProductAdded(String),
    ProductDeleted(String),
    CartUpdated(CartDetail),
    Error(String),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::MessageList(_) => "messageList",
            ServerEvent::UpdateProducts(_) => "updateProducts",
            ServerEvent::ProductAdded(_) => "productAdded",
            ServerEvent::ProductDeleted(_) => "productDeleted",
            ServerEvent::CartUpdated(_) => "cartUpdated",
            ServerEvent::Error(_) => "error",
        }
    }
}
