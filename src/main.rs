//! Snapshot Relay Binary Entry Point
//!
//! Runs the collector, or one of the mock servers it talks to.
//! Core functionality is provided by the `snapshot_relay` library crate.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use snapshot_relay::{
    collector::Collector,
    config::{AppConfig, ServerConfig, parse_duration},
    log::TracingLogger,
    server::{self, SinkState, SourceState},
    transport::HttpTransport,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long the collector may take to stop after a signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Snapshot Relay - poll snapshot sources and forward them to a sink
#[derive(Parser, Debug)]
#[command(name = "snapshot-relay", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long, env = "RELAY_CONFIG", global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll every source and forward payloads to the sink
    Collector(CollectorArgs),

    /// Run the mock snapshot source
    Source(ServerArgs),

    /// Run the mock payload sink
    Sink(ServerArgs),
}

/// Collector overrides (CLI > ENV > config file)
#[derive(Args, Debug)]
struct CollectorArgs {
    /// Number of sources to poll
    #[arg(long, env = "CAMERA_COUNT")]
    source_count: Option<usize>,

    /// Delay between polls of one source (e.g. "5s", "500ms")
    #[arg(long, env = "POLL_INTERVAL", value_parser = parse_duration)]
    poll_interval: Option<Duration>,

    /// Cycles allowed in flight at once (0 = one per source)
    #[arg(long, env = "MAX_CONCURRENT")]
    max_concurrent: Option<usize>,

    /// Base URL of the source server
    #[arg(long, env = "CAMERA_BASE_URL")]
    source_base_url: Option<String>,

    /// URL payloads are posted to
    #[arg(long, env = "TARGET_URL")]
    sink_url: Option<String>,
}

/// Mock server overrides
#[derive(Args, Debug)]
struct ServerArgs {
    /// Bind address (overrides config file)
    #[arg(long)]
    bind: Option<String>,

    /// Port (overrides config file)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,snapshot_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    match cli.command {
        Command::Collector(args) => {
            args.apply(&mut config);
            config.validate()?;
            run_collector(config).await
        }
        Command::Source(args) => {
            args.apply(&mut config.source_server);
            config.validate()?;
            let router = server::source_router(SourceState::default());
            run_server("source", &config.source_server, router).await
        }
        Command::Sink(args) => {
            args.apply(&mut config.sink_server);
            config.validate()?;
            let router = server::sink_router(SinkState::default());
            run_server("sink", &config.sink_server, router).await
        }
    }
}

impl CollectorArgs {
    fn apply(self, config: &mut AppConfig) {
        let collector = &mut config.collector;
        if let Some(count) = self.source_count {
            collector.source_count = count;
        }
        if let Some(interval) = self.poll_interval {
            collector.poll_interval = interval;
        }
        if let Some(max) = self.max_concurrent {
            collector.max_concurrent = max;
        }
        if let Some(url) = self.source_base_url {
            collector.source_base_url = url;
        }
        if let Some(url) = self.sink_url {
            collector.sink_url = url;
        }
    }
}

impl ServerArgs {
    fn apply(self, server: &mut ServerConfig) {
        if let Some(bind) = self.bind {
            server.bind = bind;
        }
        if let Some(port) = self.port {
            server.port = port;
        }
    }
}

async fn run_collector(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config.collector;
    tracing::info!(
        "Collector: {} sources, source {}, sink {}",
        settings.source_count,
        settings.source_base_url,
        settings.sink_url,
    );

    let transport = Arc::new(HttpTransport::new(&settings)?);
    let collector = Arc::new(Collector::new(
        settings,
        transport.clone(),
        transport,
        Arc::new(TracingLogger::new()),
    )?);

    let shutdown = CancellationToken::new();
    let task = {
        let collector = Arc::clone(&collector);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { collector.start(shutdown).await })
    };

    tracing::info!("Press Ctrl+C to shutdown");
    shutdown_signal().await;
    shutdown.cancel();

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => tracing::error!("Collector task failed: {}", e),
        Err(_) => tracing::warn!("Collector did not stop within {:?}", SHUTDOWN_TIMEOUT),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_server(
    name: &str,
    server: &ServerConfig,
    router: axum::Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Mock {} listening on: http://{}", name, addr);

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.cancel();
    });

    server::serve(listener, router, shutdown).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
