use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::{BTreeMap, HashMap};

use super::types::RoomInfo;

/// Playback state of a member's player.
///
/// Clients report numeric states; the server itself only writes the
/// `init` and `close` labels on connect and disconnect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum VideoState {
    Code(i64),
    Label(String),
}

impl VideoState {
    pub fn init() -> Self {
        VideoState::Label("init".to_string())
    }

    pub fn closed() -> Self {
        VideoState::Label("close".to_string())
    }

    /// Zero and the empty label count as "not set" in update-user-info
    pub fn is_set(&self) -> bool {
        match self {
            VideoState::Code(code) => *code != 0,
            VideoState::Label(label) => !label.is_empty(),
        }
    }
}

impl Default for VideoState {
    fn default() -> Self {
        Self::init()
    }
}

/// Player positions and sync states arrive as any JSON number
pub(crate) fn is_zero(value: &Number) -> bool {
    value.as_f64().map_or(true, |v| v == 0.0)
}

/// A member as stored inside a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberModel {
    pub email: String,
    pub nickname: String,
    pub url: Option<String>,
    pub tab_id: String,
    pub socketio: bool,
    pub video_state: VideoState,
    pub video_progress: Number,
}

impl MemberModel {
    pub fn new(email: String, nickname: String, tab_id: String) -> Self {
        Self {
            email,
            nickname,
            url: None,
            tab_id,
            socketio: false,
            video_state: VideoState::init(),
            video_progress: Number::from(0),
        }
    }
}

/// Mutations applied to a stored room in one step
#[derive(Debug, Clone, PartialEq)]
pub enum RoomUpdate {
    SetSocket {
        email: String,
        connected: bool,
    },
    SetVideoState {
        email: String,
        state: VideoState,
    },
    SetVideoProgress {
        email: String,
        progress: Number,
    },
    /// Connect bookkeeping: socket up, state back to `init`
    Connected {
        email: String,
    },
    /// Disconnect bookkeeping: socket down, state `close`, progress reset
    Disconnected {
        email: String,
    },
    /// Values announced by a client right after it connected
    Announce {
        email: String,
        url: String,
        state: VideoState,
        progress: Number,
    },
    StartSyncRound,
    MarkSynced {
        email: String,
        state: Number,
    },
}

/// In-memory room model
#[derive(Debug, Clone, PartialEq)]
pub struct RoomModel {
    pub room_number: String,
    pub room_url: String,
    pub video_identify: String,
    /// email -> member
    pub users: BTreeMap<String, MemberModel>,
    /// One entry per sync round, email -> 0 (waiting) or non-zero (ready)
    pub sync_state: Vec<HashMap<String, Number>>,
}

impl RoomModel {
    pub fn new(room_number: String, room_url: String) -> Self {
        Self {
            room_number,
            room_url,
            video_identify: String::new(),
            users: BTreeMap::new(),
            sync_state: Vec::new(),
        }
    }

    pub fn has_member(&self, email: &str) -> bool {
        self.users.contains_key(email)
    }

    pub fn member_count(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Adds a member unless one with the same email is already present
    pub fn add_member(&mut self, member: MemberModel) -> bool {
        if self.has_member(&member.email) {
            return false;
        }
        self.users.insert(member.email.clone(), member);
        true
    }

    pub fn remove_member(&mut self, email: &str) -> bool {
        self.users.remove(email).is_some()
    }

    /// Starts a new sync round with every current member waiting
    pub fn start_sync_round(&mut self) {
        let round = self
            .users
            .keys()
            .map(|email| (email.clone(), Number::from(0)))
            .collect();
        self.sync_state.push(round);
    }

    /// Records a member's state in the current round.
    /// Returns false when no round has been started yet.
    pub fn mark_synced(&mut self, email: &str, state: Number) -> bool {
        match self.sync_state.last_mut() {
            Some(round) => {
                round.insert(email.to_string(), state);
                true
            }
            None => false,
        }
    }

    pub fn is_sync_round_ready(&self) -> bool {
        self.sync_state
            .last()
            .map(|round| round.values().all(|state| !is_zero(state)))
            .unwrap_or(false)
    }

    /// Applies an update, returning whether anything matched
    pub fn apply(&mut self, update: RoomUpdate) -> bool {
        match update {
            RoomUpdate::StartSyncRound => {
                self.start_sync_round();
                true
            }
            RoomUpdate::MarkSynced { email, state } => self.mark_synced(&email, state),
            RoomUpdate::SetSocket { email, connected } => self.with_member(&email, |member| {
                member.socketio = connected;
            }),
            RoomUpdate::SetVideoState { email, state } => self.with_member(&email, |member| {
                member.video_state = state;
            }),
            RoomUpdate::SetVideoProgress { email, progress } => {
                self.with_member(&email, |member| {
                    member.video_progress = progress;
                })
            }
            RoomUpdate::Connected { email } => self.with_member(&email, |member| {
                member.socketio = true;
                member.video_state = VideoState::init();
            }),
            RoomUpdate::Disconnected { email } => self.with_member(&email, |member| {
                member.socketio = false;
                member.video_state = VideoState::closed();
                member.video_progress = Number::from(0);
            }),
            RoomUpdate::Announce {
                email,
                url,
                state,
                progress,
            } => self.with_member(&email, |member| {
                member.url = Some(url);
                member.video_state = state;
                member.video_progress = progress;
            }),
        }
    }

    fn with_member(&mut self, email: &str, f: impl FnOnce(&mut MemberModel)) -> bool {
        match self.users.get_mut(email) {
            Some(member) => {
                f(member);
                true
            }
            None => false,
        }
    }

    /// Public view of the room, as broadcast in `room-panel`
    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            room_number: self.room_number.clone(),
            room_url: self.room_url.clone(),
            video_identify: self.video_identify.clone(),
            users: self.users.clone(),
        }
    }
}
