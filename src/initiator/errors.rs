use thiserror::Error;

#[derive(Error, Debug)]
pub enum InitiatorError {
    #[error("Create room request failed: {0}")]
    Request(String),

    #[error("Create room returned {status}: {body}")]
    Status {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Create room response is not JSON: {0}")]
    InvalidBody(String),

    #[error("Invalid page location: {0}")]
    Location(String),

    #[error("Real-time transport error: {0}")]
    Transport(String),

    #[error("Connection closed before the namespace accepted it")]
    ClosedBeforeConnect,

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

impl InitiatorError {
    /// True for failures of the create-room request itself
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            InitiatorError::Request(_)
                | InitiatorError::Status { .. }
                | InitiatorError::InvalidBody(_)
        )
    }
}
