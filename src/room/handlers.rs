use axum::{extract::State, Json};
use tracing::{info, instrument};

use super::types::{JoinRoomRequest, LeaveRoomRequest, RoomCreateRequest};
use crate::member::Member;
use crate::shared::{ApiResponse, AppError, AppState};

/// HTTP handler for creating a new room
///
/// POST /create-room
#[instrument(name = "create_room", skip(state, request), fields(email = %member.email))]
pub async fn create_room(
    State(state): State<AppState>,
    member: Member,
    Json(request): Json<RoomCreateRequest>,
) -> Result<ApiResponse, AppError> {
    info!("Creating new room");
    state.room_service.create_room(&member, request).await
}

/// HTTP handler for joining an existing room
///
/// POST /join-room
#[instrument(name = "join_room", skip(state, request), fields(email = %member.email))]
pub async fn join_room(
    State(state): State<AppState>,
    member: Member,
    Json(request): Json<JoinRoomRequest>,
) -> Result<ApiResponse, AppError> {
    state.room_service.join_room(&member, request).await
}

/// POST /leave-room
#[instrument(name = "leave_room", skip(state, request), fields(email = %member.email))]
pub async fn leave_room(
    State(state): State<AppState>,
    member: Member,
    Json(request): Json<LeaveRoomRequest>,
) -> Result<ApiResponse, AppError> {
    state.room_service.leave_room(&member, request).await
}

/// GET /profile
#[instrument(name = "profile", skip(state), fields(email = %member.email))]
pub async fn profile(
    State(state): State<AppState>,
    member: Member,
) -> Result<ApiResponse, AppError> {
    state.room_service.profile(&member).await
}
