use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockpoll::config::{Config, LoggingConfig};
use stockpoll::crawler::HttpFetcher;
use stockpoll::dispatch::{Dispatcher, PollContext};
use stockpoll::report::ConsoleReporter;
use stockpoll::scheduler::{shutdown_channel, Scheduler};
use stockpoll::sources::AdapterRegistry;

#[derive(Parser)]
#[command(
    name = "stockpoll",
    version,
    about = "Polls bookstore product pages and reports stock, price and quantity",
    long_about = None
)]
struct Cli {
    /// Product URL to poll (repeat for several products)
    #[arg(short, long = "url")]
    urls: Vec<String>,

    /// Seconds between polls of the same product
    #[arg(short, long)]
    interval: Option<u64>,

    /// TOML config file; environment variables are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop every product on the first failure
    #[arg(long, default_value = "false")]
    fail_fast: bool,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    setup_tracing(&config.logging, cli.verbose)?;
    config.validate()?;
    let targets = config.tracked_targets()?;

    tracing::info!(
        targets = targets.len(),
        interval_secs = config.poller.interval_secs,
        fail_fast = config.poller.fail_fast,
        "stockpoll starting"
    );

    let (shutdown, signal) = shutdown_channel();
    let scheduler = Scheduler::new(signal);

    let transport = HttpFetcher::with_config(
        config.request_timeout(),
        config.poller.user_agent.clone(),
    )
    .context("Failed to create HTTP client")?;

    let dispatcher = Dispatcher::new(PollContext {
        scheduler: scheduler.clone(),
        transport: Arc::new(transport),
        reporter: Arc::new(ConsoleReporter::new()),
        registry: AdapterRegistry::with_defaults(config.poller.user_agent.clone()),
        interval: config.interval(),
        fail_fast: config.poller.fail_fast,
    });

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, stopping after the current poll");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for interrupt"),
        }
    });

    dispatcher.seed_all(&targets).await?;
    scheduler.run().await?;

    tracing::info!("stockpoll stopped");
    Ok(())
}

/// Resolve configuration from file or environment, then apply CLI overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    if !cli.urls.is_empty() {
        config.poller.targets = cli.urls.clone();
    }
    if let Some(interval) = cli.interval {
        config.poller.interval_secs = interval;
    }
    if let Some(timeout) = cli.timeout {
        config.poller.request_timeout_secs = Some(timeout);
    }
    if cli.fail_fast {
        config.poller.fail_fast = true;
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    Ok(config)
}

fn setup_tracing(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("stockpoll=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("stockpoll={},warn", logging.level))
            .context("Invalid log level")?
    };

    match logging.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
