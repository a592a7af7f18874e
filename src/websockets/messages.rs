use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::room::models::VideoState;
use crate::room::types::RoomInfo;

/// Event names exchanged on the `/room` namespace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageType {
    // Client -> Server
    #[serde(rename = "user-init")]
    UserInit,
    #[serde(rename = "update-user-info")]
    UpdateUserInfo,
    #[serde(rename = "sync-event")]
    SyncEvent,

    // Server -> Client
    #[serde(rename = "connect")]
    Connect,
    #[serde(rename = "room-panel")]
    RoomPanel,
    #[serde(rename = "videoAction")]
    VideoAction,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::UserInit => "user-init",
            MessageType::UpdateUserInfo => "update-user-info",
            MessageType::SyncEvent => "sync-event",
            MessageType::Connect => "connect",
            MessageType::RoomPanel => "room-panel",
            MessageType::VideoAction => "videoAction",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

// Client-to-Server message payloads

/// First message a client sends after the namespace accepted it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInitPayload {
    pub url: String,
    pub room_number: Option<String>,
    pub video_state: VideoState,
    pub video_progress: Number,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInfoPayload {
    pub current_state: Option<VideoState>,
    pub current_progress: Option<Number>,
    pub current_socketio: Option<bool>,
}

pub const SYNC_ACTION_INIT: &str = "init new sync state";
pub const SYNC_ACTION_UPDATE: &str = "update sync state";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncEventPayload {
    #[serde(default)]
    pub action: String,
    pub time: Option<serde_json::Value>,
    #[serde(rename = "type")]
    pub sync_type: Option<String>,
    pub state: Option<Number>,
}

// Server-to-Client message payloads

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectPayload {
    pub namespace: String,
    pub sid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum VideoActionPayload {
    Pause {
        time: serde_json::Value,
        #[serde(rename = "type")]
        sync_type: Option<String>,
    },
    Play,
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    fn with_payload<T: Serialize>(
        message_type: MessageType,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(message_type, serde_json::to_value(payload)?))
    }

    /// Create a user-init message
    pub fn user_init(payload: UserInitPayload) -> Result<Self, serde_json::Error> {
        Self::with_payload(MessageType::UserInit, &payload)
    }

    /// Create a connect acknowledgement
    pub fn connect(namespace: &str, sid: &str) -> Result<Self, serde_json::Error> {
        let payload = ConnectPayload {
            namespace: namespace.to_string(),
            sid: sid.to_string(),
        };
        Self::with_payload(MessageType::Connect, &payload)
    }

    /// Create a room-panel message
    pub fn room_panel(room: RoomInfo) -> Result<Self, serde_json::Error> {
        Self::with_payload(MessageType::RoomPanel, &room)
    }

    /// Create a videoAction message
    pub fn video_action(action: VideoActionPayload) -> Result<Self, serde_json::Error> {
        Self::with_payload(MessageType::VideoAction, &action)
    }

    /// Decodes the payload into a typed structure
    pub fn payload_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
