//! Real-time Backend Module
//!
//! WebSocket channel carrying the live product list, cart updates and a
//! chat room.
//!
//! - `hub` - broadcast channel shared by all sockets; also the catalog's
//!   product broadcaster
//! - `session` - per-socket event handling
//! - `socket` - axum WebSocket transport
//! - `chat` - in-memory message log

pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod hub;
pub mod router;
pub mod session;
pub mod socket;

// Re-exports for convenience
pub use chat::{ChatLog, ChatMessage};
pub use config::RealtimeConfig;
pub use error::{RealtimeError, RealtimeResult};
pub use event::{ClientEvent, ServerEvent};
pub use hub::RealtimeHub;
pub use router::realtime_router;
pub use session::{RealtimeState, Session};

#[cfg(test)]
mod tests;
