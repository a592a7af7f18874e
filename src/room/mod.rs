// Public API - what other modules can use
pub use handlers::{create_room, join_room, leave_room, profile};
pub use service::RoomService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
