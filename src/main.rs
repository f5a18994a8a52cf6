use std::net::SocketAddr;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use helpdesk_relay::config::Config;
use helpdesk_relay::notify::{MessageFormatter, Notifier};
use helpdesk_relay::sdp::SdpClient;
use helpdesk_relay::server::{AppState, build_router};
use helpdesk_relay::store::SnapshotStore;
use helpdesk_relay::subscribers::SubscriberRegistry;
use helpdesk_relay::telegram::BotClient;
use helpdesk_relay::worker::{CommandListener, PollLoop, SystemClock};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helpdesk_relay=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        error!(error = %e, "Relay stopped");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!(?config, "Starting relay");

    let source = SdpClient::new(config.sdp.clone())?;
    let bot = BotClient::new(config.telegram.clone())?;

    let store = SnapshotStore::new();
    let registry = SubscriberRegistry::new();
    let notifier = Notifier::new(bot, registry.clone());
    let formatter = MessageFormatter::new(config.link_template.clone());

    let poll = PollLoop::new(
        source.clone(),
        notifier.clone(),
        store.clone(),
        formatter.clone(),
        SystemClock,
        config.poll.clone(),
    );
    let listener = CommandListener::new(
        source,
        notifier,
        formatter,
        SystemClock,
        config.listener.clone(),
    );

    let shutdown = CancellationToken::new();
    let poll_task = tokio::spawn(poll.run(shutdown.clone()));
    let listener_task = tokio::spawn(listener.run(shutdown.clone()));

    let app = build_router(AppState::new(store, registry, Utc::now()));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let tcp = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    let serve_shutdown = shutdown.clone();
    axum::serve(tcp, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown requested");
            serve_shutdown.cancel();
        })
        .await?;

    // The server can also stop on its own; make sure the loops follow.
    shutdown.cancel();
    let (poll_result, listener_result) = tokio::join!(poll_task, listener_task);
    poll_result?;
    listener_result?;

    info!("Relay stopped cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
