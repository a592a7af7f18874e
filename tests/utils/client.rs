//! Clients acting as a named member against a running server
#![allow(dead_code)] // Test utilities may not all be used in every test

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, http::HeaderValue, Message},
    MaybeTlsStream, WebSocketStream,
};

use syncroom::{
    member::{EMAIL_HEADER, NICKNAME_HEADER},
    MessageType, WebSocketMessage,
};

use super::setup::TestServer;

const READ_TIMEOUT: Duration = Duration::from_secs(2);
const QUIET_PERIOD: Duration = Duration::from_millis(200);

// ============================================================================
// HTTP
// ============================================================================

/// Calls the room endpoints with a member's identity headers
pub struct MemberClient {
    pub email: String,
    pub nickname: String,
    base_url: String,
    http: reqwest::Client,
}

impl MemberClient {
    pub fn new(server: &TestServer, email: &str, nickname: &str) -> Self {
        Self {
            email: email.to_string(),
            nickname: nickname.to_string(),
            base_url: server.http_url(""),
            http: reqwest::Client::new(),
        }
    }

    pub async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(EMAIL_HEADER, &self.email)
            .header(NICKNAME_HEADER, &self.nickname)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    pub async fn create_room(&self, room_number: &str) -> Value {
        let (status, body) = self
            .post(
                "/create-room",
                json!({
                    "roomNumber": room_number,
                    "roomUrl": "https://videos.example.com/watch?v=1",
                    "tabId": 1,
                }),
            )
            .await;
        assert_eq!(status, 200);
        body
    }

    pub async fn join_room(&self, room_number: &str) -> Value {
        let (status, body) = self
            .post(
                "/join-room",
                json!({ "roomNumber": room_number, "tabId": 2 }),
            )
            .await;
        assert_eq!(status, 200);
        body
    }

    pub async fn leave_room(&self, room_number: &str) -> Value {
        let (status, body) = self
            .post("/leave-room", json!({ "roomNumber": room_number }))
            .await;
        assert_eq!(status, 200);
        body
    }

    pub async fn profile(&self) -> Value {
        self.http
            .get(format!("{}/profile", self.base_url))
            .header(EMAIL_HEADER, &self.email)
            .header(NICKNAME_HEADER, &self.nickname)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// Opens the member's namespace socket and consumes the connect ack
    pub async fn connect(&self, server: &TestServer) -> NamespaceClient {
        let mut request = server.ws_url("/room").into_client_request().unwrap();
        let headers = request.headers_mut();
        headers.insert(EMAIL_HEADER, HeaderValue::from_str(&self.email).unwrap());
        headers.insert(
            NICKNAME_HEADER,
            HeaderValue::from_str(&self.nickname).unwrap(),
        );

        let (stream, _) = connect_async(request).await.unwrap();
        let mut client = NamespaceClient { stream };
        client.expect(MessageType::Connect).await;
        client
    }
}

// ============================================================================
// Namespace socket
// ============================================================================

pub struct NamespaceClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl NamespaceClient {
    pub async fn emit(&mut self, message_type: MessageType, payload: Value) {
        let message = WebSocketMessage::new(message_type, payload);
        let text = serde_json::to_string(&message).unwrap();
        self.stream.send(Message::text(text)).await.unwrap();
    }

    /// Next event, or `None` if nothing arrives within `wait`
    pub async fn next_within(&mut self, wait: Duration) -> Option<WebSocketMessage> {
        loop {
            let frame = timeout(wait, self.stream.next()).await.ok()??;
            if let Message::Text(text) = frame.unwrap() {
                return Some(serde_json::from_str(text.as_str()).unwrap());
            }
        }
    }

    /// Reads the next event and checks its type
    pub async fn expect(&mut self, expected: MessageType) -> WebSocketMessage {
        let message = self
            .next_within(READ_TIMEOUT)
            .await
            .unwrap_or_else(|| panic!("expected a {} event", expected));
        assert_eq!(message.message_type, expected, "received wrong event type");
        message
    }

    /// Skips events until one of the expected type arrives
    pub async fn expect_eventually(&mut self, expected: MessageType) -> WebSocketMessage {
        loop {
            let message = self
                .next_within(READ_TIMEOUT)
                .await
                .unwrap_or_else(|| panic!("expected a {} event", expected));
            if message.message_type == expected {
                return message;
            }
        }
    }

    /// Asserts that no event of the given type arrives for a short while
    pub async fn expect_none_of(&mut self, unexpected: MessageType) {
        while let Some(message) = self.next_within(QUIET_PERIOD).await {
            assert_ne!(
                message.message_type, unexpected,
                "received an unexpected event"
            );
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
