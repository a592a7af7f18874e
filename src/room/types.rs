use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::models::MemberModel;

/// Request payload for creating a new room
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomCreateRequest {
    pub room_number: Option<serde_json::Value>,
    pub room_url: Option<serde_json::Value>,
    pub tab_id: Option<serde_json::Value>,
}

/// Request payload for joining an existing room
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub room_number: Option<serde_json::Value>,
    pub tab_id: Option<serde_json::Value>,
}

/// Request payload for leaving a room
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeaveRoomRequest {
    pub room_number: Option<serde_json::Value>,
}

/// Room information as shown to members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomInfo {
    pub room_number: String,
    pub room_url: String,
    pub video_identify: String,
    pub users: BTreeMap<String, MemberModel>,
}

/// Renders a loosely-typed request field as text.
///
/// Numbers are accepted and stringified; a missing field becomes `default`.
pub(crate) fn field_text(value: &Option<serde_json::Value>, default: &str) -> String {
    match value {
        None | Some(serde_json::Value::Null) => default.to_string(),
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_text() {
        assert_eq!(field_text(&None, ""), "");
        assert_eq!(field_text(&Some(json!(null)), "None"), "None");
        assert_eq!(field_text(&Some(json!("42")), ""), "42");
        assert_eq!(field_text(&Some(json!(7)), ""), "7");
    }

    #[test]
    fn test_create_request_accepts_partial_body() {
        let request: RoomCreateRequest = serde_json::from_str(r#"{"roomNumber": "42"}"#).unwrap();
        assert_eq!(field_text(&request.room_number, ""), "42");
        assert!(request.room_url.is_none());
        assert!(request.tab_id.is_none());
    }
}
