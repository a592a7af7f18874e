// Library crate for the syncroom watch-party service and its room initiator
// This file exposes the public API for the binaries and integration tests

pub mod config;
pub mod initiator;
pub mod member;
pub mod room;
pub mod server;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use initiator::{InitiatorConfig, InitiatorError, RoomInitiator, RoomSession};
pub use member::Member;
pub use room::{models::RoomModel, repository::RoomRepository};
pub use shared::{ApiResponse, AppError, AppState};
pub use websockets::{ConnectionManager, MessageType, WebSocketMessage};
