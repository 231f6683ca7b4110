//! Pacing Engine — spend pacing and budget reallocation for paid-search accounts.
//!
//! Serves reports over HTTP, or computes one report from a snapshot file and exits.

use chrono::{NaiveDate, Utc};
use clap::Parser;
use pacing_api::ApiServer;
use pacing_core::config::AppConfig;
use pacing_reporting::{load_snapshot, ReportBuilder};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "pacing-engine")]
#[command(about = "Spend pacing and budget reallocation for paid-search accounts")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "PACING_ENGINE__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "PACING_ENGINE__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// JSON snapshot to preload (served by GET /v1/metrics)
    #[arg(long)]
    snapshot: Option<String>,

    /// Compute one report from --snapshot, print it to stdout and exit
    #[arg(long, default_value_t = false)]
    report: bool,

    /// Reference "today" (YYYY-MM-DD); the snapshot's asOf still wins
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --report output stays clean JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pacing_engine=info,pacing_reporting=info,pacing_api=info,tower_http=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    info!("Pacing Engine starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        roas_threshold = config.optimizer.roas_threshold,
        max_shift = config.optimizer.max_shift,
        excluded_customers = config.exclusions.customers.len(),
        "Configuration loaded"
    );

    let builder = Arc::new(ReportBuilder::from_config(&config)?);

    let snapshot = match &cli.snapshot {
        Some(path) => Some(load_snapshot(path, config.api.max_events)?),
        None => None,
    };

    if cli.report {
        let Some(snapshot) = snapshot else {
            anyhow::bail!("--report requires --snapshot <path>");
        };
        let today = cli.as_of.unwrap_or_else(|| Utc::now().date_naive());
        let report = builder.build(&snapshot, today);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let api_server = ApiServer::new(config.clone(), builder, snapshot.map(Arc::new));

    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Pacing Engine is ready to serve traffic");

    api_server.start_http().await?;

    Ok(())
}
