use clap::Parser;

use crate::initiator::{
    InitiatorConfig, InitiatorError, PageLocation, DEFAULT_CREATE_ROOM_URL,
};
use crate::websockets::ROOM_NAMESPACE;

/// Syncroom server
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerArgs {
    #[arg(short, long, default_value = "0.0.0.0:5000")]
    pub listen_addr: String,
}

/// Create a room and announce this client on its namespace
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CreateRoomArgs {
    /// room number to request
    #[arg(short, long, default_value = "")]
    pub room_number: String,

    #[arg(long, default_value = DEFAULT_CREATE_ROOM_URL)]
    pub create_room_url: String,

    /// origin of the page the namespace URL is built from
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub origin: String,

    #[arg(long, default_value = ROOM_NAMESPACE)]
    pub namespace: String,

    /// keep the connection open and log incoming events
    #[arg(short, long)]
    pub follow: bool,
}

impl CreateRoomArgs {
    pub fn initiator_config(&self) -> Result<InitiatorConfig, InitiatorError> {
        Ok(InitiatorConfig {
            create_room_url: self.create_room_url.clone(),
            location: PageLocation::parse(&self.origin)?,
            namespace: self.namespace.clone(),
        })
    }
}
