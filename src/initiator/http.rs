use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::InitiatorError;

pub const DEFAULT_CREATE_ROOM_URL: &str = "http://127.0.0.1:5000/create-room";

/// Body of the create-room POST
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateRoomRequest {
    #[serde(rename = "roomNumber")]
    pub room_number: String,
}

/// Sends the create-room request
#[async_trait]
pub trait CreateRoomClient: Send + Sync {
    /// Returns the JSON response body of a 2xx response
    async fn create_room(
        &self,
        endpoint: &str,
        request: &CreateRoomRequest,
    ) -> Result<serde_json::Value, InitiatorError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestCreateRoomClient {
    client: reqwest::Client,
}

impl ReqwestCreateRoomClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CreateRoomClient for ReqwestCreateRoomClient {
    async fn create_room(
        &self,
        endpoint: &str,
        request: &CreateRoomRequest,
    ) -> Result<serde_json::Value, InitiatorError> {
        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| InitiatorError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InitiatorError::Request(e.to_string()))?;
        debug!(status = %status, body = %text, "Create room response");

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
            return Err(InitiatorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&text).map_err(|e| InitiatorError::InvalidBody(e.to_string()))
    }
}
