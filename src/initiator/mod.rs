//! Client side of room creation: POST the room number, then join the
//! `/room` namespace and announce the session with `user-init`.

// Public API
pub use errors::InitiatorError;
pub use http::{
    CreateRoomClient, CreateRoomRequest, ReqwestCreateRoomClient, DEFAULT_CREATE_ROOM_URL,
};
pub use location::PageLocation;
pub use session::RoomSession;
pub use source::{FixedRoomNumber, RoomNumberField, RoomNumberSource};
pub use transport::{RealtimeConnector, RealtimeSocket, TungsteniteConnector};

// Internal modules
mod errors;
mod http;
mod location;
mod session;
mod source;
mod transport;

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::websockets::{MessageType, ROOM_NAMESPACE};

/// Where the initiator sends its request and which page it runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatorConfig {
    pub create_room_url: String,
    pub location: PageLocation,
    pub namespace: String,
}

impl Default for InitiatorConfig {
    fn default() -> Self {
        Self {
            create_room_url: DEFAULT_CREATE_ROOM_URL.to_string(),
            location: PageLocation::new("http:", "127.0.0.1", 5000),
            namespace: ROOM_NAMESPACE.to_string(),
        }
    }
}

pub struct RoomInitiator {
    config: InitiatorConfig,
    room_number_source: Arc<dyn RoomNumberSource>,
    http: Arc<dyn CreateRoomClient>,
    connector: Arc<dyn RealtimeConnector>,
}

impl RoomInitiator {
    pub fn new(
        config: InitiatorConfig,
        room_number_source: Arc<dyn RoomNumberSource>,
        http: Arc<dyn CreateRoomClient>,
        connector: Arc<dyn RealtimeConnector>,
    ) -> Self {
        Self {
            config,
            room_number_source,
            http,
            connector,
        }
    }

    /// Initiator backed by reqwest and tokio-tungstenite
    pub fn with_defaults(
        config: InitiatorConfig,
        room_number_source: Arc<dyn RoomNumberSource>,
    ) -> Self {
        Self::new(
            config,
            room_number_source,
            Arc::new(ReqwestCreateRoomClient::default()),
            Arc::new(TungsteniteConnector),
        )
    }

    pub fn config(&self) -> &InitiatorConfig {
        &self.config
    }

    /// Creates the room and joins its namespace.
    ///
    /// Every call is independent: one POST, and on success one new
    /// connection that emits exactly one `user-init`. A failed request is
    /// logged and returned; nothing is retried.
    #[instrument(skip(self), fields(endpoint = %self.config.create_room_url))]
    pub async fn create(&self) -> Result<RoomSession, InitiatorError> {
        let request = CreateRoomRequest {
            room_number: self.room_number_source.room_number(),
        };
        info!(room_number = %request.room_number, "Posting create-room request");

        let response = match self
            .http
            .create_room(&self.config.create_room_url, &request)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Create room request failed");
                return Err(e);
            }
        };
        info!(response = %response, "Create room request succeeded");

        let url = self.config.location.namespace_url(&self.config.namespace);
        let mut socket = self.connector.connect(&url).await?;
        wait_for_connect(socket.as_mut()).await?;
        info!(url = %url, "Namespace connected");

        let mut session = RoomSession::new(url, response, socket);
        session.announce().await?;
        debug!("Session init message sent");

        Ok(session)
    }
}

/// Resolves on the namespace's `connect` event
async fn wait_for_connect(socket: &mut dyn RealtimeSocket) -> Result<(), InitiatorError> {
    loop {
        match socket.next_message().await? {
            Some(message) if message.message_type == MessageType::Connect => return Ok(()),
            Some(message) => {
                debug!(message_type = %message.message_type, "Ignoring event received before connect")
            }
            None => return Err(InitiatorError::ClosedBeforeConnect),
        }
    }
}
