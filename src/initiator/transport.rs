use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, trace};

use super::errors::InitiatorError;
use crate::websockets::WebSocketMessage;

/// Opens real-time connections
#[async_trait]
pub trait RealtimeConnector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn RealtimeSocket>, InitiatorError>;
}

/// One open real-time connection
#[async_trait]
pub trait RealtimeSocket: Send {
    async fn emit(&mut self, message: &WebSocketMessage) -> Result<(), InitiatorError>;

    /// Next event from the server, `None` once the connection is closed
    async fn next_message(&mut self) -> Result<Option<WebSocketMessage>, InitiatorError>;

    async fn close(&mut self) -> Result<(), InitiatorError>;
}

/// Maps a page URL onto the WebSocket scheme it is dialled with
pub fn dial_url(url: &str) -> Result<Url, InitiatorError> {
    let mut target = Url::parse(url).map_err(|e| InitiatorError::Location(e.to_string()))?;
    let scheme = match target.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(InitiatorError::Location(format!(
                "cannot dial {other} url {url}"
            )))
        }
    };
    target
        .set_scheme(scheme)
        .map_err(|()| InitiatorError::Location(format!("cannot dial {url}")))?;
    Ok(target)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl RealtimeConnector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn RealtimeSocket>, InitiatorError> {
        let target = dial_url(url)?;
        debug!(url = %target, "Connecting to namespace");

        let (stream, _) = connect_async(target.as_str()).await.map_err(|e| {
            debug!(url = %target, error = %e, "Namespace handshake failed");
            InitiatorError::Transport(e.to_string())
        })?;

        debug!(url = %target, "WebSocket handshake has been successfully completed");
        Ok(Box::new(TungsteniteSocket { stream }))
    }
}

pub struct TungsteniteSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl RealtimeSocket for TungsteniteSocket {
    async fn emit(&mut self, message: &WebSocketMessage) -> Result<(), InitiatorError> {
        let text = serde_json::to_string(message)?;
        trace!(message = %text, "Sending namespace event");
        self.stream
            .send(Message::text(text))
            .await
            .map_err(|e| InitiatorError::Transport(e.to_string()))
    }

    async fn next_message(&mut self) -> Result<Option<WebSocketMessage>, InitiatorError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<WebSocketMessage>(text.as_str()) {
                        Ok(message) => return Ok(Some(message)),
                        Err(e) => debug!(error = %e, "Skipping unreadable namespace frame"),
                    }
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // binary/ping/pong
                Some(Err(e)) => return Err(InitiatorError::Transport(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), InitiatorError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| InitiatorError::Transport(e.to_string()))
    }
}
