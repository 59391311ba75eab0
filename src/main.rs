#![warn(clippy::pedantic, clippy::all, clippy::nursery)]

use photoroll::{config::RuntimeConfiguration, routes::router, state::PhotoRollState};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

async fn shutdown_signal(state: PhotoRollState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
    state.sensible_shutdown().await;
}

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");

    match dotenv_result {
        Ok(path) => info!(?path, "Loaded env vars"),
        Err(e) if e.not_found() => debug!("No .env file, using the environment as-is"),
        Err(e) => panic!("unable to load env vars: {e}"),
    }

    let config = RuntimeConfiguration::new().expect("unable to create config");
    let server_config = config.server_config();
    info!(?server_config, "Loaded config");

    let options = SqlitePoolOptions::new().max_connections(5);
    let state = PhotoRollState::new(options, config)
        .await
        .expect("unable to create state");

    let app = router(state.clone());

    let listener = TcpListener::bind(server_config.server_ip)
        .await
        .expect("unable to listen on server ip");

    info!(server_ip = ?server_config.server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .expect("unable to serve app");
}
