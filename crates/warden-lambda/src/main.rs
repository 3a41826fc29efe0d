//! warden-lambda - session policy enforcement function
//!
//! Wires the components together:
//! - Configuration loading (environment, optional TOML base layer)
//! - AWS adapters (Glue session control, SNS notifications)
//! - The enforcer, shared read-only across invocations
//! - The Lambda runtime loop
//!
//! Configuration is loaded once at cold start. Invalid configuration fails
//! the cold start instead of running without limits.

mod handler;

use anyhow::{Context, Result};
use clap::Parser;
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warden_config::load_config;
use warden_control_aws::{load_sdk_config, GlueSessionController, SnsNotifier};
use warden_core::Enforcer;

/// warden-lambda - Enforces limits on new Glue interactive sessions
#[derive(Parser, Debug)]
#[command(name = "warden-lambda")]
#[command(about = "Enforces limits on new Glue interactive sessions", long_about = None)]
struct Args {
    /// Log level, used when RUST_LOG is not set
    #[arg(short, long, env = "WARDEN_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Process a single event from a JSON file and exit instead of serving
    /// invocations
    #[arg(short, long)]
    event: Option<PathBuf>,
}

async fn build_enforcer() -> Result<Enforcer> {
    let policy = load_config().context("Failed to load session-warden configuration")?;

    info!(
        max_workers = policy.limits.max_workers,
        max_idle_timeout_minutes = policy.limits.max_idle_timeout_minutes(),
        kill_on_violation = policy.limits.kill_on_violation,
        "Configuration loaded"
    );

    let sdk_config = load_sdk_config().await;
    let controller = Arc::new(GlueSessionController::new(&sdk_config));
    let notifier = Arc::new(SnsNotifier::new(&sdk_config));

    Ok(Enforcer::new(Arc::new(policy), controller, notifier))
}

async fn run_once(enforcer: &Enforcer, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event from {:?}", path))?;
    let payload: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse event in {:?}", path))?;

    let outcome = handler::process(enforcer, &payload, None).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_current_span(false)
        .without_time()
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "warden-lambda starting");

    let enforcer = Arc::new(build_enforcer().await?);

    if let Some(path) = &args.event {
        return run_once(&enforcer, path).await;
    }

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let enforcer = enforcer.clone();
        async move { handler::handle_event(&enforcer, event).await }
    }))
    .await
    .map_err(|e| anyhow::anyhow!(e))
}
