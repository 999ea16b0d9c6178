use clap::Parser;
use eyre::Result;
use nova_launch::{
    config::{IpfsConfig, StellarConfig},
    ipfs::PinataClient,
    relay::{
        bind,
        config::RelayConfig,
        listener::{SorobanEventSource, StellarEventListener},
        run_server,
        webhooks::Dispatcher,
        RelayState, DRAIN_TIMEOUT,
    },
};
use std::{env::var, path::PathBuf, sync::Arc};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(about = "Relays token factory events to webhook subscribers")]
struct Cli {
    /// Dotenv file to load instead of `.env`.
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Environment variables are safe to use after this
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    setup_tracing()?;

    // Load the configuration
    let stellar_config = StellarConfig::from_env()?;
    let relay_config = RelayConfig::from_env()?;
    let ipfs_config = IpfsConfig::from_env();

    tracing::info!(
        environment = %relay_config.environment,
        network = %stellar_config.network,
        rpc = %stellar_config.endpoints.soroban_rpc_url,
        "starting relay"
    );

    if ipfs_config.has_credentials() {
        let pinata = PinataClient::new(ipfs_config)?;
        if !pinata.test_connection().await {
            tracing::warn!("IPFS credentials were rejected by the pinning service");
        }
    }

    let state = Arc::new(RelayState::new(&relay_config)?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Start the event listener
    let listener_task = match &stellar_config.factory_contract_id {
        Some(contract_id) => {
            let source = SorobanEventSource::new(stellar_config.endpoints.soroban_rpc_url.clone(), contract_id.clone())?;
            let dispatcher =
                Dispatcher::new(Arc::clone(&state.store), state.metrics.clone(), relay_config.webhook_timeout)?;
            let listener = StellarEventListener::new(source, dispatcher, state.metrics.clone(), relay_config.poll_interval);
            Some(listener.start(shutdown_rx.clone()))
        }
        None => {
            tracing::warn!("FACTORY_CONTRACT_ID not set, event listener not started");
            None
        }
    };

    // Start the relay server
    let socket = bind(relay_config.socket_addr).await?;
    let mut server = tokio::spawn(run_server(socket, Arc::clone(&state), shutdown_rx));

    tokio::select! {
        () = shutdown_signal() => tracing::info!("shutdown requested"),
        result = &mut server => {
            result??;
            return Ok(());
        }
    }
    // Fails only once both tasks have already exited
    let _ = shutdown_tx.send(true);

    if let Some(task) = listener_task {
        if tokio::time::timeout(DRAIN_TIMEOUT, task).await.is_err() {
            tracing::warn!("event listener did not stop in time");
        }
    }
    server.await??;

    Ok(())
}

/// Set up the subscriber for tracing
fn setup_tracing() -> Result<()> {
    // Add a filter to the subscriber to control the verbosity of the logs
    let filter = var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::builder().parse(filter)?;

    tracing_subscriber::registry().with(env_filter).with(tracing_subscriber::fmt::layer()).init();

    Ok(())
}

/// Resolves on ctrl-c or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
