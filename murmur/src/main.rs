#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::path::Path;

use args::Args;
use clap::Parser;
use murmur_config::Config;
use murmur_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    murmur_telemetry::init(&config.telemetry, args.log_filter.as_deref())?;

    tracing::info!(
        config_path = ?args.config,
        backend = %config.backend.base_url,
        timeout_seconds = config.polling.timeout_seconds,
        "starting murmur"
    );

    let server = match args.listen {
        Some(listen) => Server::new(&config)?.with_listen_address(listen),
        None => Server::new(&config)?,
    };

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    server.serve(shutdown).await?;

    tracing::info!("murmur stopped");
    Ok(())
}

/// File config when a path is given, environment config otherwise
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::from_env(),
    }
}

/// Cancel `shutdown` on the first `SIGINT` or `SIGTERM`
async fn cancel_on_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::pin!(terminate);

    let received = tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => "SIGINT",
            Err(e) => {
                tracing::warn!("cannot listen for SIGINT: {e}");
                (&mut terminate).await;
                "SIGTERM"
            }
        },
        () = &mut terminate => "SIGTERM",
    };

    tracing::info!(signal = received, "shutting down");
    shutdown.cancel();
}
