use serde_json::{json, Number};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{is_zero, MemberModel, RoomModel, RoomUpdate},
    repository::{CreateRoomResult, JoinRoomResult, LeaveRoomResult, RoomRepository},
    types::{field_text, JoinRoomRequest, LeaveRoomRequest, RoomCreateRequest},
};
use crate::member::Member;
use crate::shared::{AppError, ApiResponse};
use crate::websockets::messages::{
    SyncEventPayload, UpdateUserInfoPayload, UserInitPayload, VideoActionPayload,
    WebSocketMessage, SYNC_ACTION_INIT, SYNC_ACTION_UPDATE,
};
use crate::websockets::ConnectionManager;

/// Service for handling room business logic
pub struct RoomService {
    repository: Arc<dyn RoomRepository + Send + Sync>,
    connections: Arc<dyn ConnectionManager>,
}

fn refuse(msg: String) -> ApiResponse {
    info!(msg = %msg, "Room request refused");
    ApiResponse::failure(msg)
}

fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_numeric)
}

impl RoomService {
    pub fn new(
        repository: Arc<dyn RoomRepository + Send + Sync>,
        connections: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            repository,
            connections,
        }
    }

    /// Creates a room with the caller as its first member
    #[instrument(skip(self, member, request), fields(email = %member.email))]
    pub async fn create_room(
        &self,
        member: &Member,
        request: RoomCreateRequest,
    ) -> Result<ApiResponse, AppError> {
        let tab_id = field_text(&request.tab_id, "");
        let room_number = field_text(&request.room_number, "");
        let room_url = field_text(&request.room_url, "");

        if room_url.is_empty() {
            return Ok(refuse(format!("room url ({}) invalid", room_url)));
        }

        if !is_numeric(&tab_id) {
            return Ok(refuse(format!("tab id ({}) invalid", tab_id)));
        }

        if room_number.is_empty() || room_number == "None" {
            return Ok(refuse(format!(
                "room number({}) cannot be empty",
                room_number
            )));
        }

        let room = RoomModel::new(room_number.clone(), room_url);
        let host = MemberModel::new(member.email.clone(), member.nickname.clone(), tab_id);

        match self.repository.create_room(room, host).await? {
            CreateRoomResult::MemberInRoom(current) => Ok(refuse(format!(
                "{} already in room({})",
                member.nickname, current
            ))),
            CreateRoomResult::RoomExists => {
                Ok(refuse(format!("room({}) already exists", room_number)))
            }
            CreateRoomResult::Created(room) => {
                self.broadcast_room_panel(&room).await;

                let msg = format!("room({}) create success", room_number);
                info!(room_number = %room_number, "Room created successfully");
                Ok(ApiResponse::success(msg, json!({ "room": room.info() })))
            }
        }
    }

    /// Adds the caller to an existing room
    #[instrument(skip(self, member, request), fields(email = %member.email))]
    pub async fn join_room(
        &self,
        member: &Member,
        request: JoinRoomRequest,
    ) -> Result<ApiResponse, AppError> {
        let room_number = field_text(&request.room_number, "None");
        let tab_id = field_text(&request.tab_id, "");

        if !is_numeric(&tab_id) {
            return Ok(refuse(format!("tab id ({}) invalid", tab_id)));
        }

        let joining = MemberModel::new(member.email.clone(), member.nickname.clone(), tab_id);

        match self.repository.try_join_room(&room_number, joining).await? {
            JoinRoomResult::MemberInRoom(current) => Ok(refuse(format!(
                "{} already in room({})",
                member.nickname, current
            ))),
            JoinRoomResult::RoomNotFound => {
                Ok(refuse(format!("room({}) does not exist", room_number)))
            }
            JoinRoomResult::Success(room) => {
                self.broadcast_room_panel(&room).await;

                let msg = format!("{} join room({})", member.nickname, room_number);
                info!(room_number = %room_number, "Member joined room");
                Ok(ApiResponse::success(msg, json!({ "room": room.info() })))
            }
        }
    }

    /// Removes the caller from a room, deleting the room once it is empty
    #[instrument(skip(self, member, request), fields(email = %member.email))]
    pub async fn leave_room(
        &self,
        member: &Member,
        request: LeaveRoomRequest,
    ) -> Result<ApiResponse, AppError> {
        let room_number = field_text(&request.room_number, "None");

        match self
            .repository
            .leave_room(&room_number, &member.email)
            .await?
        {
            LeaveRoomResult::RoomNotFound => {
                return Ok(refuse(format!("room({}) does not exist", room_number)))
            }
            LeaveRoomResult::MemberNotInRoom => {
                return Ok(refuse(format!(
                    "{} not in room({})",
                    member.email, room_number
                )))
            }
            LeaveRoomResult::Success(room) => self.broadcast_room_panel(&room).await,
            LeaveRoomResult::RoomDeleted => {
                info!(room_number = %room_number, "Room had been deleted");
            }
        }

        let msg = format!("{} leave room({})", member.nickname, room_number);
        info!(room_number = %room_number, "Member left room");
        Ok(ApiResponse::success(msg, json!({})))
    }

    /// The caller's member entry and, when in a room, the room itself
    #[instrument(skip(self, member), fields(email = %member.email))]
    pub async fn profile(&self, member: &Member) -> Result<ApiResponse, AppError> {
        let Some(room) = self.repository.get_room_by_member(&member.email).await? else {
            let user = json!({ "email": member.email, "nickname": member.nickname });
            return Ok(ApiResponse::success("success", json!({ "user": user })));
        };

        let user = room
            .users
            .get(&member.email)
            .map(|entry| json!(entry))
            .unwrap_or_else(|| json!({ "email": member.email, "nickname": member.nickname }));

        Ok(ApiResponse::success(
            "success",
            json!({ "user": user, "room": room.info() }),
        ))
    }

    /// A namespace socket opened: join it to the caller's room, if any
    #[instrument(skip(self, member), fields(email = %member.email))]
    pub async fn member_connected(
        &self,
        member: &Member,
        connection_id: &str,
    ) -> Result<(), AppError> {
        if let Some(room) = self.repository.get_room_by_member(&member.email).await? {
            self.connections
                .join_room(connection_id, &room.room_number)
                .await;
            self.update_and_notify(
                &room.room_number,
                RoomUpdate::Connected {
                    email: member.email.clone(),
                },
            )
            .await?;
        }

        info!(nickname = %member.nickname, "Socket connected");
        Ok(())
    }

    /// A namespace socket closed
    #[instrument(skip(self, member), fields(email = %member.email))]
    pub async fn member_disconnected(
        &self,
        member: &Member,
        connection_id: &str,
    ) -> Result<(), AppError> {
        if let Some(room) = self.repository.get_room_by_member(&member.email).await? {
            self.connections
                .leave_room(connection_id, &room.room_number)
                .await;
            self.update_and_notify(
                &room.room_number,
                RoomUpdate::Disconnected {
                    email: member.email.clone(),
                },
            )
            .await?;
        }

        info!(nickname = %member.nickname, "Socket disconnected");
        Ok(())
    }

    /// Records what a client announced right after connecting
    #[instrument(skip(self, member, payload), fields(email = %member.email))]
    pub async fn user_init(
        &self,
        member: &Member,
        payload: UserInitPayload,
    ) -> Result<(), AppError> {
        info!(
            url = %payload.url,
            room_number = ?payload.room_number,
            "User init received"
        );

        let Some(room) = self.repository.get_room_by_member(&member.email).await? else {
            debug!("Member is not in a room, nothing to record");
            return Ok(());
        };

        self.update_and_notify(
            &room.room_number,
            RoomUpdate::Announce {
                email: member.email.clone(),
                url: payload.url,
                state: payload.video_state,
                progress: payload.video_progress,
            },
        )
        .await
    }

    /// Applies the fields of update-user-info that are present and set
    #[instrument(skip(self, member, payload), fields(email = %member.email))]
    pub async fn update_user_info(
        &self,
        member: &Member,
        payload: UpdateUserInfoPayload,
    ) -> Result<(), AppError> {
        let Some(room) = self.repository.get_room_by_member(&member.email).await? else {
            debug!("Member is not in a room, ignoring update-user-info");
            return Ok(());
        };

        let email = member.email.clone();
        let mut updates = Vec::new();
        if let Some(progress) = payload.current_progress.filter(|p| !is_zero(p)) {
            updates.push(RoomUpdate::SetVideoProgress {
                email: email.clone(),
                progress,
            });
        }
        if let Some(state) = payload.current_state.filter(|s| s.is_set()) {
            updates.push(RoomUpdate::SetVideoState {
                email: email.clone(),
                state,
            });
        }
        if payload.current_socketio == Some(true) {
            updates.push(RoomUpdate::SetSocket {
                email,
                connected: true,
            });
        }

        if updates.is_empty() {
            return Ok(());
        }

        let mut latest = None;
        for update in updates {
            latest = self
                .repository
                .update_room(&room.room_number, update)
                .await?;
        }

        if let Some(room) = latest {
            self.broadcast_room_panel(&room).await;
            info!("User info updated");
        }
        Ok(())
    }

    /// Drives the pause / ready / play handshake of a room
    #[instrument(skip(self, member, payload), fields(email = %member.email, action = %payload.action))]
    pub async fn sync_event(
        &self,
        member: &Member,
        payload: SyncEventPayload,
    ) -> Result<(), AppError> {
        let Some(room) = self.repository.get_room_by_member(&member.email).await? else {
            warn!("Sync event from a member outside any room");
            return Ok(());
        };

        match payload.action.as_str() {
            SYNC_ACTION_INIT => {
                self.repository
                    .update_room(&room.room_number, RoomUpdate::StartSyncRound)
                    .await?;
                info!(room_number = %room.room_number, "New sync round started");

                let pause = VideoActionPayload::Pause {
                    time: payload.time.unwrap_or(serde_json::Value::Null),
                    sync_type: payload.sync_type,
                };
                self.broadcast(&room.room_number, WebSocketMessage::video_action(pause))
                    .await;
            }
            SYNC_ACTION_UPDATE => {
                let update = RoomUpdate::MarkSynced {
                    email: member.email.clone(),
                    state: payload.state.unwrap_or_else(|| Number::from(0)),
                };
                let updated = self.repository.update_room(&room.room_number, update).await?;

                if updated.is_some_and(|room| room.is_sync_round_ready()) {
                    info!(room_number = %room.room_number, "Every member ready, playing");
                    self.broadcast(
                        &room.room_number,
                        WebSocketMessage::video_action(VideoActionPayload::Play),
                    )
                    .await;
                }
            }
            other => debug!(action = %other, "Unhandled sync action"),
        }

        Ok(())
    }

    async fn update_and_notify(
        &self,
        room_number: &str,
        update: RoomUpdate,
    ) -> Result<(), AppError> {
        if let Some(room) = self.repository.update_room(room_number, update).await? {
            self.broadcast_room_panel(&room).await;
        }
        Ok(())
    }

    async fn broadcast_room_panel(&self, room: &RoomModel) {
        self.broadcast(&room.room_number, WebSocketMessage::room_panel(room.info()))
            .await;
    }

    async fn broadcast(
        &self,
        room_number: &str,
        message: Result<WebSocketMessage, serde_json::Error>,
    ) {
        match message.and_then(|message| serde_json::to_string(&message)) {
            Ok(text) => self.connections.send_to_room(room_number, &text).await,
            Err(e) => warn!(error = %e, "Failed to encode room broadcast"),
        }
    }
}
