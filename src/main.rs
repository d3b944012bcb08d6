//! Betting-exchange sweepstakes service entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use exchange_sweeps::allocation::AllocationPolicy;
use exchange_sweeps::api::{create_router, AppState};
use exchange_sweeps::config::Config;
use exchange_sweeps::market::{ExchangeClient, MarketDataProvider};
use exchange_sweeps::metrics;
use exchange_sweeps::sweepstake::{generate, Sweepstake, SweepstakeRequest};
use exchange_sweeps::tasks;

/// Betting-exchange sweepstakes generator.
#[derive(Parser, Debug)]
#[command(name = "exchange-sweeps")]
#[command(about = "Generate and refresh probability-weighted sweepstakes from exchange markets")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a one-off sweepstake and print it.
    Generate {
        /// Name of the sweepstake.
        name: String,

        /// Exchange market ID to price.
        market_id: String,

        /// Participant names.
        #[arg(required = true, num_args = 1..)]
        participants: Vec<String>,

        /// Method used to assign selections to participants.
        #[arg(long, default_value = "tiered")]
        method: String,

        /// Exclude selections with no lay depth (unquotable longshots).
        #[arg(long)]
        ignore_longshots: bool,
    },

    /// Run the HTTP API and the background refresh task.
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("exchange_sweeps=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    metrics::init_metrics();

    match args.command {
        Command::Generate {
            name,
            market_id,
            participants,
            method,
            ignore_longshots,
        } => cmd_generate(name, market_id, participants, method, ignore_longshots).await,
        Command::Serve { port } => cmd_serve(port).await,
        Command::CheckConfig => cmd_check_config().await,
    }
}

/// Generate one sweepstake against the live exchange and print it.
async fn cmd_generate(
    name: String,
    market_id: String,
    participants: Vec<String>,
    method: String,
    ignore_longshots: bool,
) -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let policy = AllocationPolicy::parse(&method)?;
    let client = ExchangeClient::new(&config);

    let request = SweepstakeRequest {
        name,
        market_id,
        policy,
        participants,
        ignore_longshots,
    };

    let mut rng = StdRng::from_entropy();
    let sweepstake = generate(&client, &request, &mut rng).await?;

    print_sweepstake(&sweepstake);
    Ok(())
}

/// Render a sweepstake for the terminal, favorites first per participant.
fn print_sweepstake(sweepstake: &Sweepstake) {
    let hundred = Decimal::ONE_HUNDRED;

    println!(
        "{} (market {}, method {})",
        sweepstake.name, sweepstake.market_id, sweepstake.policy
    );

    for participant in &sweepstake.participants {
        println!("  {} ({:.2}%)", participant.name, participant.equity * hundred);
        for assignment in &participant.assignments {
            println!(
                "      {} ({:.2}%)",
                assignment.name,
                assignment.current_probability() * hundred
            );
        }
    }
}

/// Run the HTTP API and refresh loop until interrupted.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let port = port_override.unwrap_or(config.port);

    if config.metrics_enabled {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::from(([0, 0, 0, 0], config.metrics_port)))
            .install()
            .context("failed to install Prometheus exporter")?;
        info!(port = config.metrics_port, "metrics exporter listening");
    }

    let provider: Arc<dyn MarketDataProvider> = Arc::new(ExchangeClient::new(&config));
    let state = AppState::new(provider.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresh_handle = tokio::spawn(tasks::run_refresh_task(
        provider,
        state.store.clone(),
        config.refresh_interval_secs,
        shutdown_rx,
    ));

    let app = create_router(state.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    state.set_ready(true);
    info!(%addr, "sweepstakes api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    let _ = refresh_handle.await;

    info!("shutdown complete");
    Ok(())
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("EXCHANGE SWEEPS - CONFIGURATION CHECK");
    println!("======================================================================");

    let config = Config::load().context("failed to load configuration")?;

    println!("Exchange base URL:    {}", config.exchange_base_url);
    println!("App key set:          {}", !config.exchange_app_key.is_empty());
    println!("Session token set:    {}", !config.exchange_session_token.is_empty());
    println!("Refresh interval:     {}s", config.refresh_interval_secs);
    println!("API port:             {}", config.port);
    println!(
        "Metrics:              {}",
        if config.metrics_enabled {
            format!("enabled on port {}", config.metrics_port)
        } else {
            "disabled".to_string()
        }
    );

    match config.validate() {
        Ok(()) => {
            println!("Configuration OK");
            Ok(())
        }
        Err(e) => {
            println!("Configuration INVALID: {e}");
            anyhow::bail!("invalid configuration")
        }
    }
}

/// Resolve when the process receives an interrupt or terminate signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
