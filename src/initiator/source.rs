use std::sync::{Arc, RwLock};

/// Where the initiator reads the room number from.
///
/// Read once per `create()` call, at call time.
pub trait RoomNumberSource: Send + Sync {
    fn room_number(&self) -> String;
}

/// A room number fixed at construction
#[derive(Debug, Clone)]
pub struct FixedRoomNumber(pub String);

impl RoomNumberSource for FixedRoomNumber {
    fn room_number(&self) -> String {
        self.0.clone()
    }
}

/// An editable input field; clones share the same value
#[derive(Debug, Clone, Default)]
pub struct RoomNumberField {
    value: Arc<RwLock<String>>,
}

impl RoomNumberField {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Arc::new(RwLock::new(value.into())),
        }
    }

    pub fn set(&self, value: impl Into<String>) {
        let mut current = match self.value.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = value.into();
    }
}

impl RoomNumberSource for RoomNumberField {
    fn room_number(&self) -> String {
        match self.value.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
