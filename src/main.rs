use std::sync::Arc;

use academia::config::Config;
use academia::portal::Portal;
use academia::server::Server;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    init_logging();

    info!(
        listen = %config.listen,
        data_dir = %config.data_dir.display(),
        max_connections = config.max_connections,
        "starting academia"
    );

    let portal = Portal::open_dir(&config.data_dir, config.default_admin()).await?;
    let listener = TcpListener::bind(config.listen).await?;
    let server = Server::new(listener, Arc::new(portal), config.max_connections);
    info!(addr = %server.local_addr()?, "listening");

    server.serve_with_shutdown(shutdown_signal()).await;
    Ok(())
}

/// Logs go to stderr. `RUST_LOG` overrides the default filter.
fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("academia=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl-C"),
        Err(e) => {
            // Without a signal handler the server runs until killed.
            error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await
        }
    }
}
