use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

use super::models::{MemberModel, RoomModel, RoomUpdate};
use crate::shared::AppError;

/// Result of attempting to create a room
#[derive(Debug, Clone)]
pub enum CreateRoomResult {
    /// Room created with the host as its first member
    Created(RoomModel),
    /// The host already belongs to a room, carries that room's number
    MemberInRoom(String),
    /// A room with the same number already exists
    RoomExists,
}

/// Result of attempting to join a room
#[derive(Debug, Clone)]
pub enum JoinRoomResult {
    /// Successfully joined the room, returns updated room data
    Success(RoomModel),
    /// The member already belongs to a room, carries that room's number
    MemberInRoom(String),
    /// Room does not exist
    RoomNotFound,
}

/// Result of attempting to leave a room
#[derive(Debug, Clone)]
pub enum LeaveRoomResult {
    /// Successfully left the room, returns updated room data
    Success(RoomModel),
    /// Member was not in the room
    MemberNotInRoom,
    /// Room does not exist
    RoomNotFound,
    /// Room was deleted because no members left
    RoomDeleted,
}

/// Trait for room repository operations
#[async_trait]
pub trait RoomRepository {
    /// Atomically creates a room and binds its host to it
    async fn create_room(
        &self,
        room: RoomModel,
        host: MemberModel,
    ) -> Result<CreateRoomResult, AppError>;

    async fn get_room(&self, room_number: &str) -> Result<Option<RoomModel>, AppError>;

    /// Room the member currently belongs to, if any
    async fn get_room_by_member(&self, email: &str) -> Result<Option<RoomModel>, AppError>;

    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError>;

    async fn try_join_room(
        &self,
        room_number: &str,
        member: MemberModel,
    ) -> Result<JoinRoomResult, AppError>;

    async fn leave_room(&self, room_number: &str, email: &str)
        -> Result<LeaveRoomResult, AppError>;

    /// Applies an update to a stored room.
    /// Returns the updated room, or `None` when the room does not exist.
    async fn update_room(
        &self,
        room_number: &str,
        update: RoomUpdate,
    ) -> Result<Option<RoomModel>, AppError>;
}

#[derive(Default)]
struct Registry {
    /// room number -> room
    rooms: HashMap<String, RoomModel>,
    /// email -> room number
    member_rooms: HashMap<String, String>,
}

/// In-memory implementation of RoomRepository
pub struct InMemoryRoomRepository {
    registry: Mutex<Registry>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
        }
    }

    fn registry(&self) -> Result<MutexGuard<'_, Registry>, AppError> {
        self.registry.lock().map_err(|_| AppError::Internal)
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self, room, host), fields(room_number = %room.room_number, host = %host.email))]
    async fn create_room(
        &self,
        mut room: RoomModel,
        host: MemberModel,
    ) -> Result<CreateRoomResult, AppError> {
        let mut registry = self.registry()?;

        if let Some(current) = registry.member_rooms.get(&host.email) {
            debug!(current_room = %current, "Host already in a room");
            return Ok(CreateRoomResult::MemberInRoom(current.clone()));
        }

        if registry.rooms.contains_key(&room.room_number) {
            debug!("Room already exists in memory");
            return Ok(CreateRoomResult::RoomExists);
        }

        let host_email = host.email.clone();
        room.add_member(host);
        registry
            .member_rooms
            .insert(host_email, room.room_number.clone());
        registry.rooms.insert(room.room_number.clone(), room.clone());

        debug!("Room created successfully in memory");
        Ok(CreateRoomResult::Created(room))
    }

    #[instrument(skip(self))]
    async fn get_room(&self, room_number: &str) -> Result<Option<RoomModel>, AppError> {
        let registry = self.registry()?;
        let room = registry.rooms.get(room_number).cloned();

        match &room {
            Some(r) => debug!(members = r.member_count(), "Room found in memory"),
            None => debug!("Room not found in memory"),
        }

        Ok(room)
    }

    #[instrument(skip(self))]
    async fn get_room_by_member(&self, email: &str) -> Result<Option<RoomModel>, AppError> {
        let registry = self.registry()?;
        let room = registry
            .member_rooms
            .get(email)
            .and_then(|room_number| registry.rooms.get(room_number))
            .cloned();
        Ok(room)
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        let registry = self.registry()?;
        Ok(registry.rooms.values().cloned().collect())
    }

    #[instrument(skip(self, member), fields(email = %member.email))]
    async fn try_join_room(
        &self,
        room_number: &str,
        member: MemberModel,
    ) -> Result<JoinRoomResult, AppError> {
        let mut registry = self.registry()?;

        if let Some(current) = registry.member_rooms.get(&member.email) {
            debug!(current_room = %current, "Member already in a room");
            return Ok(JoinRoomResult::MemberInRoom(current.clone()));
        }

        let room = match registry.rooms.get_mut(room_number) {
            Some(room) => room,
            None => {
                debug!("Room not found");
                return Ok(JoinRoomResult::RoomNotFound);
            }
        };

        let email = member.email.clone();
        room.add_member(member);
        let updated_room = room.clone();
        registry
            .member_rooms
            .insert(email, room_number.to_string());

        info!(
            members = updated_room.member_count(),
            "Member joined room successfully (atomic)"
        );

        Ok(JoinRoomResult::Success(updated_room))
    }

    #[instrument(skip(self))]
    async fn leave_room(
        &self,
        room_number: &str,
        email: &str,
    ) -> Result<LeaveRoomResult, AppError> {
        let mut registry = self.registry()?;

        let room = match registry.rooms.get_mut(room_number) {
            Some(room) => room,
            None => {
                info!("Room not found");
                return Ok(LeaveRoomResult::RoomNotFound);
            }
        };

        if !room.remove_member(email) {
            info!("Member not in room");
            return Ok(LeaveRoomResult::MemberNotInRoom);
        }

        let now_empty = room.is_empty();
        let updated_room = room.clone();
        registry.member_rooms.remove(email);

        if now_empty {
            info!("Room is now empty, deleting");
            registry.rooms.remove(room_number);
            return Ok(LeaveRoomResult::RoomDeleted);
        }

        info!(
            members = updated_room.member_count(),
            "Member left room successfully (atomic)"
        );

        Ok(LeaveRoomResult::Success(updated_room))
    }

    #[instrument(skip(self))]
    async fn update_room(
        &self,
        room_number: &str,
        update: RoomUpdate,
    ) -> Result<Option<RoomModel>, AppError> {
        let mut registry = self.registry()?;

        match registry.rooms.get_mut(room_number) {
            Some(room) => {
                if !room.apply(update) {
                    debug!("Room update matched nothing");
                }
                Ok(Some(room.clone()))
            }
            None => {
                debug!("Room not found for update");
                Ok(None)
            }
        }
    }
}
