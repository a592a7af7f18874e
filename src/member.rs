use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;
use tracing::debug;
use uuid::Uuid;

pub const EMAIL_HEADER: &str = "x-member-email";
pub const NICKNAME_HEADER: &str = "x-member-nickname";

const GUEST_NICKNAME: &str = "guest";

/// Identity of whoever is calling a room endpoint or holding a namespace socket.
///
/// There is no login: the identity is read from request headers as-is, and a
/// caller without them becomes a fresh guest on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub email: String,
    pub nickname: String,
}

impl Member {
    pub fn new(email: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            nickname: nickname.into(),
        }
    }

    pub fn guest() -> Self {
        Self {
            email: format!("guest-{}", Uuid::new_v4()),
            nickname: GUEST_NICKNAME.to_string(),
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        match header(EMAIL_HEADER) {
            Some(email) => {
                let nickname = header(NICKNAME_HEADER).unwrap_or(email);
                Self::new(email, nickname)
            }
            None => {
                let guest = Self::guest();
                debug!(email = %guest.email, "No identity headers, using guest member");
                guest
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Member
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Member::from_headers(&parts.headers))
    }
}
