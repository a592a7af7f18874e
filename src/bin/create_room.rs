use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use syncroom::{
    config::CreateRoomArgs,
    initiator::{FixedRoomNumber, RoomInitiator},
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "syncroom=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CreateRoomArgs::parse();
    let config = match args.initiator_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(2);
        }
    };

    let initiator =
        RoomInitiator::with_defaults(config, Arc::new(FixedRoomNumber(args.room_number.clone())));

    // failures are already logged by the initiator
    let Ok(mut session) = initiator.create().await else {
        std::process::exit(1);
    };
    info!(url = %session.url(), "Session initialised");

    if args.follow {
        loop {
            match session.next_message().await {
                Ok(Some(message)) => {
                    info!(event = %message.message_type, payload = %message.payload, "Event")
                }
                Ok(None) => {
                    info!("Namespace connection closed");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Namespace connection failed");
                    std::process::exit(1);
                }
            }
        }
    } else if let Err(e) = session.close().await {
        error!(error = %e, "Failed to close namespace connection");
    }
}
