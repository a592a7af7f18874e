use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::room::repository::RoomRepository;
use crate::room::RoomService;
use crate::websockets::ConnectionManager;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub room_repository: Arc<dyn RoomRepository + Send + Sync>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub room_service: Arc<RoomService>,
}

impl AppState {
    pub fn new(
        room_repository: Arc<dyn RoomRepository + Send + Sync>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        let room_service = Arc::new(RoomService::new(
            Arc::clone(&room_repository),
            Arc::clone(&connection_manager),
        ));

        Self {
            room_repository,
            connection_manager,
            room_service,
        }
    }
}

/// Failures that are not room refusals; refusals travel as `ApiResponse`
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ApiResponse::failure(self.to_string()));

        (status, body).into_response()
    }
}

/// Envelope returned by every room endpoint.
///
/// `code` is 0 on success and 1 when the request was understood but refused.
/// Refusals still travel with HTTP 200.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    pub code: i32,
    pub msg: String,
    pub data: serde_json::Value,
}

impl ApiResponse {
    pub fn success(msg: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code: 0,
            msg: msg.into(),
            data,
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            code: 1,
            msg: msg.into(),
            data: json!({}),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
