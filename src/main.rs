use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use syncroom::{config::ServerArgs, server};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "syncroom=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = ServerArgs::parse();
    info!(listen_addr = %args.listen_addr, "Starting syncroom server");

    let listener = match tokio::net::TcpListener::bind(&args.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, listen_addr = %args.listen_addr, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    if let Err(e) = server::serve(listener, server::in_memory_state()).await {
        error!(error = %e, "Server stopped with an error");
        std::process::exit(1);
    }
}
