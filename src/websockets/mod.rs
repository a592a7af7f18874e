// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use handler::{namespace_handler, NamespaceReceiveHandler, ROOM_NAMESPACE};
pub use messages::{MessageType, WebSocketMessage};
pub use socket::MessageHandler;

// Internal modules
mod connection_manager;
mod handler;
pub mod messages;
mod socket;
