use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::room::{self, repository::InMemoryRoomRepository};
use crate::shared::AppState;
use crate::websockets::{namespace_handler, InMemoryConnectionManager, ROOM_NAMESPACE};

/// App state wired with the in-memory repository and connection manager
pub fn in_memory_state() -> AppState {
    AppState::new(
        Arc::new(InMemoryRoomRepository::new()),
        Arc::new(InMemoryConnectionManager::new()),
    )
}

/// Room endpoints plus the real-time namespace
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/create-room", post(room::create_room))
        .route("/join-room", post(room::join_room))
        .route("/leave-room", post(room::leave_room))
        .route("/profile", get(room::profile))
        .route(ROOM_NAMESPACE, get(namespace_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Serves the router on an already bound listener until the process stops
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Server running on http://{}", addr);
    }
    axum::serve(listener, router(app_state)).await
}
