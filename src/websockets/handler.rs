use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::member::Member;
use crate::room::RoomService;
use crate::shared::AppState;
use crate::websockets::messages::{MessageType, WebSocketMessage};
use crate::websockets::ConnectionManager;

use super::socket::{Connection, MessageHandler};

/// Namespace path the real-time endpoint is mounted on
pub const ROOM_NAMESPACE: &str = "/room";

/// Message handler for frames received on the `/room` namespace
pub struct NamespaceReceiveHandler {
    room_service: Arc<RoomService>,
}

impl NamespaceReceiveHandler {
    pub fn new(room_service: Arc<RoomService>) -> Self {
        Self { room_service }
    }
}

#[async_trait]
impl MessageHandler for NamespaceReceiveHandler {
    async fn handle_message(&self, member: &Member, connection_id: &str, message: String) {
        debug!(
            email = %member.email,
            connection_id = %connection_id,
            message = %message,
            "Received message"
        );

        let ws_message = match serde_json::from_str::<WebSocketMessage>(&message) {
            Ok(ws_message) => ws_message,
            Err(e) => {
                warn!(
                    email = %member.email,
                    error = %e,
                    "Failed to parse namespace message"
                );
                return;
            }
        };

        let result = match ws_message.message_type {
            MessageType::UserInit => match ws_message.payload_as() {
                Ok(payload) => self.room_service.user_init(member, payload).await,
                Err(e) => {
                    warn!(error = %e, "Invalid user-init payload");
                    Ok(())
                }
            },
            MessageType::UpdateUserInfo => match ws_message.payload_as() {
                Ok(payload) => self.room_service.update_user_info(member, payload).await,
                Err(e) => {
                    warn!(error = %e, "Invalid update-user-info payload");
                    Ok(())
                }
            },
            MessageType::SyncEvent => match ws_message.payload_as() {
                Ok(payload) => self.room_service.sync_event(member, payload).await,
                Err(e) => {
                    warn!(error = %e, "Invalid sync-event payload");
                    Ok(())
                }
            },
            other => {
                debug!(message_type = %other, "Unhandled message type");
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!(
                email = %member.email,
                message_type = %ws_message.message_type,
                error = %e,
                "Failed to handle namespace message"
            );
        }
    }
}

/// Real-time endpoint of the `/room` namespace
/// GET /room, identity taken from the member headers of the upgrade request
pub async fn namespace_handler(
    ws: WebSocketUpgrade,
    member: Member,
    State(app_state): State<AppState>,
) -> Response {
    info!(email = %member.email, "Namespace connection requested");

    ws.on_upgrade(move |socket| handle_namespace_connection(socket, member, app_state))
}

/// Tells a freshly registered connection that the namespace accepted it
async fn send_connect_ack(connections: &dyn ConnectionManager, connection_id: &str) {
    let ack = WebSocketMessage::connect(ROOM_NAMESPACE, connection_id)
        .and_then(|ack| serde_json::to_string(&ack));
    match ack {
        Ok(text) => connections.send_to_connection(connection_id, &text).await,
        Err(e) => warn!(connection_id = %connection_id, error = %e, "Failed to encode connect ack"),
    }
}

/// Handle the upgraded namespace socket
async fn handle_namespace_connection(
    socket: axum::extract::ws::WebSocket,
    member: Member,
    app_state: AppState,
) {
    let connection_id = Uuid::new_v4().to_string();
    info!(
        email = %member.email,
        connection_id = %connection_id,
        "Namespace connection established"
    );

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    app_state
        .connection_manager
        .add_connection(connection_id.clone(), outbound_sender)
        .await;

    // The connect acknowledgement goes out before anything the room broadcasts
    send_connect_ack(app_state.connection_manager.as_ref(), &connection_id).await;

    if let Err(e) = app_state
        .room_service
        .member_connected(&member, &connection_id)
        .await
    {
        warn!(email = %member.email, error = %e, "Failed to register connected member");
    }

    let message_handler = Arc::new(NamespaceReceiveHandler::new(
        app_state.room_service.clone(),
    ));

    let connection = Connection::new(
        connection_id.clone(),
        member.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(
                email = %member.email,
                connection_id = %connection_id,
                "Namespace connection closed cleanly"
            );
        }
        Err(e) => {
            warn!(
                email = %member.email,
                connection_id = %connection_id,
                error = ?e,
                "Namespace connection error"
            );
        }
    }

    if let Err(e) = app_state
        .room_service
        .member_disconnected(&member, &connection_id)
        .await
    {
        warn!(email = %member.email, error = %e, "Failed to record disconnect");
    }

    app_state
        .connection_manager
        .remove_connection(&connection_id)
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::models::VideoState;
    use crate::room::repository::{InMemoryRoomRepository, RoomRepository};
    use crate::shared::test_utils::AppStateBuilder;
    use crate::websockets::messages::UserInitPayload;
    use serde_json::json;

    async fn state_with_room() -> (AppState, Member) {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let state = AppStateBuilder::new()
            .with_room_repository(repository)
            .build();
        let alice = Member::new("alice", "alice");
        state
            .room_service
            .create_room(
                &alice,
                serde_json::from_value(json!({
                    "roomNumber": "42",
                    "roomUrl": "https://video.example/1",
                    "tabId": "1",
                }))
                .unwrap(),
            )
            .await
            .unwrap();
        (state, alice)
    }

    #[tokio::test]
    async fn test_user_init_frame_updates_member() {
        let (state, alice) = state_with_room().await;
        let handler = NamespaceReceiveHandler::new(state.room_service.clone());

        let frame = WebSocketMessage::user_init(UserInitPayload {
            url: "http://127.0.0.1:5000/room".to_string(),
            room_number: None,
            video_state: VideoState::Code(0),
            video_progress: 0.into(),
        })
        .unwrap();
        handler
            .handle_message(&alice, "conn-1", serde_json::to_string(&frame).unwrap())
            .await;

        let room = state.room_repository.get_room("42").await.unwrap().unwrap();
        assert_eq!(
            room.users["alice"].url.as_deref(),
            Some("http://127.0.0.1:5000/room")
        );
    }

    #[tokio::test]
    async fn test_malformed_frames_are_ignored() {
        let (state, alice) = state_with_room().await;
        let handler = NamespaceReceiveHandler::new(state.room_service.clone());
        let before = state.room_repository.get_room("42").await.unwrap();

        handler
            .handle_message(&alice, "conn-1", "not json".to_string())
            .await;
        handler
            .handle_message(
                &alice,
                "conn-1",
                r#"{"type": "sync-event", "payload": "oops", "meta": null}"#.to_string(),
            )
            .await;
        handler
            .handle_message(
                &alice,
                "conn-1",
                r#"{"type": "room-panel", "payload": {}, "meta": null}"#.to_string(),
            )
            .await;

        let after = state.room_repository.get_room("42").await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_connect_ack_precedes_room_panel() {
        let (state, alice) = state_with_room().await;
        let (sender, mut receiver) = mpsc::unbounded_channel();
        state
            .connection_manager
            .add_connection("conn-1".to_string(), sender)
            .await;

        send_connect_ack(state.connection_manager.as_ref(), "conn-1").await;
        state
            .room_service
            .member_connected(&alice, "conn-1")
            .await
            .unwrap();

        let ack: WebSocketMessage = serde_json::from_str(&receiver.try_recv().unwrap()).unwrap();
        assert_eq!(ack.message_type, MessageType::Connect);
        assert_eq!(ack.payload, json!({"namespace": "/room", "sid": "conn-1"}));

        let panel: WebSocketMessage =
            serde_json::from_str(&receiver.try_recv().unwrap()).unwrap();
        assert_eq!(panel.message_type, MessageType::RoomPanel);
    }

    #[tokio::test]
    async fn test_connect_ack_for_unknown_connection_is_dropped() {
        let (state, _) = state_with_room().await;
        let (sender, mut receiver) = mpsc::unbounded_channel();
        state
            .connection_manager
            .add_connection("conn-1".to_string(), sender)
            .await;

        send_connect_ack(state.connection_manager.as_ref(), "conn-2").await;

        assert!(receiver.try_recv().is_err());
    }
}
