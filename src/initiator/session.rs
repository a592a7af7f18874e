use super::errors::InitiatorError;
use super::transport::RealtimeSocket;
use crate::room::models::VideoState;
use crate::websockets::messages::UserInitPayload;
use crate::websockets::WebSocketMessage;

/// A created room with its live namespace connection, owned by the caller
pub struct RoomSession {
    url: String,
    // Never assigned, so user-init always carries null.
    room_number: Option<String>,
    create_response: serde_json::Value,
    socket: Box<dyn RealtimeSocket>,
}

impl RoomSession {
    pub(crate) fn new(
        url: String,
        create_response: serde_json::Value,
        socket: Box<dyn RealtimeSocket>,
    ) -> Self {
        Self {
            url,
            room_number: None,
            create_response,
            socket,
        }
    }

    /// Namespace URL the session is connected to
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn room_number(&self) -> Option<&str> {
        self.room_number.as_deref()
    }

    /// Body returned by the create-room endpoint, unvalidated
    pub fn create_response(&self) -> &serde_json::Value {
        &self.create_response
    }

    /// Session init message: paused at position 0
    pub fn init_message(&self) -> UserInitPayload {
        UserInitPayload {
            url: self.url.clone(),
            room_number: self.room_number.clone(),
            video_state: VideoState::Code(0),
            video_progress: 0.into(),
        }
    }

    pub(crate) async fn announce(&mut self) -> Result<(), InitiatorError> {
        let message = WebSocketMessage::user_init(self.init_message())?;
        self.socket.emit(&message).await
    }

    pub async fn emit(&mut self, message: &WebSocketMessage) -> Result<(), InitiatorError> {
        self.socket.emit(message).await
    }

    pub async fn next_message(&mut self) -> Result<Option<WebSocketMessage>, InitiatorError> {
        self.socket.next_message().await
    }

    pub async fn close(mut self) -> Result<(), InitiatorError> {
        self.socket.close().await
    }
}

impl std::fmt::Debug for RoomSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSession")
            .field("url", &self.url)
            .field("room_number", &self.room_number)
            .field("create_response", &self.create_response)
            .finish_non_exhaustive()
    }
}
