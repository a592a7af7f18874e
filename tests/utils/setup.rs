//! Servers the workflow tests talk to over real sockets
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tokio::{net::TcpListener, task::JoinHandle};

use syncroom::{
    initiator::{InitiatorConfig, PageLocation},
    server,
    websockets::ROOM_NAMESPACE,
    WebSocketMessage,
};

// ============================================================================
// Real server
// ============================================================================

/// The syncroom server on an ephemeral port, stopped when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            server::serve(listener, server::in_memory_state())
                .await
                .unwrap();
        });
        Self { addr, handle }
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    /// Initiator settings for a page served by this server
    pub fn initiator_config(&self) -> InitiatorConfig {
        initiator_config_for(self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn initiator_config_for(addr: SocketAddr) -> InitiatorConfig {
    InitiatorConfig {
        create_room_url: format!("http://{}/create-room", addr),
        location: PageLocation::new("http:", &addr.ip().to_string(), addr.port()),
        namespace: ROOM_NAMESPACE.to_string(),
    }
}

// ============================================================================
// Recording backend
// ============================================================================

/// Stand-in backend that records what the initiator sends
pub struct FakeBackend {
    pub addr: SocketAddr,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

struct FakeState {
    create_room_status: StatusCode,
    create_room_bodies: Mutex<Vec<Value>>,
    namespace_connections: AtomicUsize,
    namespace_messages: Mutex<Vec<WebSocketMessage>>,
}

impl FakeBackend {
    /// Answers create-room with 200 and a success body
    pub async fn accepting() -> Self {
        Self::start(StatusCode::OK).await
    }

    pub async fn start(create_room_status: StatusCode) -> Self {
        let state = Arc::new(FakeState {
            create_room_status,
            create_room_bodies: Mutex::new(Vec::new()),
            namespace_connections: AtomicUsize::new(0),
            namespace_messages: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/create-room", post(fake_create_room))
            .route(ROOM_NAMESPACE, get(fake_namespace))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn initiator_config(&self) -> InitiatorConfig {
        initiator_config_for(self.addr)
    }

    pub fn create_room_bodies(&self) -> Vec<Value> {
        self.state.create_room_bodies.lock().unwrap().clone()
    }

    pub fn namespace_connections(&self) -> usize {
        self.state.namespace_connections.load(Ordering::SeqCst)
    }

    pub fn namespace_messages(&self) -> Vec<WebSocketMessage> {
        self.state.namespace_messages.lock().unwrap().clone()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn fake_create_room(
    State(state): State<Arc<FakeState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.create_room_bodies.lock().unwrap().push(body);

    let body = if state.create_room_status.is_success() {
        json!({ "code": 0, "msg": "room created", "data": {} })
    } else {
        json!({ "error": "backend unavailable" })
    };
    (state.create_room_status, Json(body))
}

async fn fake_namespace(ws: WebSocketUpgrade, State(state): State<Arc<FakeState>>) -> Response {
    state.namespace_connections.fetch_add(1, Ordering::SeqCst);
    ws.on_upgrade(move |socket| record_namespace(socket, state))
}

async fn record_namespace(mut socket: WebSocket, state: Arc<FakeState>) {
    let ack = WebSocketMessage::connect(ROOM_NAMESPACE, "fake-sid").unwrap();
    let ack = serde_json::to_string(&ack).unwrap();
    if socket.send(Message::Text(ack)).await.is_err() {
        return;
    }

    while let Some(Ok(frame)) = socket.recv().await {
        if let Message::Text(text) = frame {
            if let Ok(message) = serde_json::from_str::<WebSocketMessage>(&text) {
                state.namespace_messages.lock().unwrap().push(message);
            }
        }
    }
}
