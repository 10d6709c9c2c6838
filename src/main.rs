//! NetAssist Relay - Main entry point
//!
//! This binary creates and runs the HTTP server with the relay routes and middleware.
//! Configuration is read once from the environment (and `.env`, if present).

use anyhow::Result;
use chrono::Local;
use netassist_relay::{
    api::{build_router, AppState, RELAY_ALIAS_PATH, RELAY_PATH},
    core::{init_metrics, AppConfig},
    services::Relay,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or_else(|| detect_cpu_limit().unwrap_or(1));

    println!("Tokio runtime: using {} worker threads", worker_threads);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Custom time formatter that uses local timezone (respects TZ environment variable)
struct LocalTime;

impl tracing_subscriber::fmt::time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S"))
    }
}

fn init_tracing() {
    let no_color = std::env::var("NO_COLOR").is_ok();

    let base_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,netassist_relay=debug".to_string());

    // Always suppress noisy HTTP library logs regardless of RUST_LOG setting
    let filter_str = format!(
        "{},hyper=warn,hyper::proto=warn,h2=warn,reqwest=warn",
        base_filter
    );
    let filter = tracing_subscriber::EnvFilter::new(filter_str);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTime)
                .with_ansi(!no_color),
        )
        .init();
}

async fn async_main() -> Result<()> {
    init_tracing();
    init_metrics();

    let config = AppConfig::from_env()?;
    tracing::info!("Relay configuration: {:?}", config.relay);

    if !config.relay.has_credential() {
        tracing::warn!(
            "GEMINI_API_KEY is not set; relay requests will fail with a configuration error"
        );
    }

    let relay = Relay::from_config(config.relay.clone())?;
    let app = build_router(Arc::new(AppState::new(relay)));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting NetAssist Relay on {}", addr);
    tracing::info!("Relay API: {}, {}", RELAY_PATH, RELAY_ALIAS_PATH);
    tracing::info!("OpenAPI document: /api-docs/openapi.json");
    tracing::info!("Metrics endpoint: /metrics");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Detect CPU limit from cgroup (for containerized environments)
fn detect_cpu_limit() -> Option<usize> {
    // cgroup v2: "<quota> <period>", quota is "max" when unlimited
    if let Ok(max) = std::fs::read_to_string("/sys/fs/cgroup/cpu.max") {
        if let Some((quota, period)) = max.trim().split_once(' ') {
            if let Some(cores) = cores_from_quota(quota, period) {
                println!("Detected CPU limit from cgroup v2: {} cores", cores);
                return Some(cores);
            }
        }
    }

    // cgroup v1
    let quota = std::fs::read_to_string("/sys/fs/cgroup/cpu/cpu.cfs_quota_us").ok()?;
    let period = std::fs::read_to_string("/sys/fs/cgroup/cpu/cpu.cfs_period_us").ok()?;
    let cores = cores_from_quota(quota.trim(), period.trim())?;
    println!("Detected CPU limit from cgroup v1: {} cores", cores);
    Some(cores)
}

fn cores_from_quota(quota: &str, period: &str) -> Option<usize> {
    let quota = quota.parse::<i64>().ok()?;
    let period = period.parse::<i64>().ok()?;
    if quota <= 0 || period <= 0 {
        return None;
    }
    Some(((quota as f64 / period as f64).ceil() as usize).max(1))
}
