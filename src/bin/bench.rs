use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use sqlbench::config::BenchConfig;
use sqlbench::dataset::{DatasetLocation, DatasetProvisioner};
use sqlbench::engine::datafusion::DataFusionSession;
use sqlbench::engine::duckdb::DuckDbSession;
use sqlbench::engine::{self, EngineSession};
use sqlbench::report::BenchReport;
use sqlbench::runner::{EngineReport, TimingRunner};
use sqlbench::suite::QuerySuite;

#[derive(Parser)]
#[command(name = "sqlbench", about = "Comparative TPC-H benchmark harness", version)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// TPC-H scale factor (overrides config)
    #[arg(long)]
    scale_factor: Option<f64>,

    /// Collect and log per-query execution profiles
    #[arg(long)]
    profile: bool,

    /// Root directory for generated datasets (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = BenchConfig::load(cli.config.as_deref())?;
    if let Some(sf) = cli.scale_factor {
        config.scale_factor = sf;
    }
    if cli.profile {
        config.profile.enabled = true;
    }
    if let Some(dir) = cli.data_dir {
        config.paths.data_dir = Some(dir.display().to_string());
    }
    config.validate()?;

    tracing::info!("Provisioning TPC-H dataset (sf={})", config.scale_factor);
    let provisioner = DatasetProvisioner::new(config.data_dir());
    let dataset = provisioner.ensure_dataset(config.scale_factor).await?;

    let suite = QuerySuite::tpch();
    let runner =
        TimingRunner::with_profiling(config.profile.enabled, config.profile.include_in_timing);

    let mut reports = Vec::new();

    let datafusion: Box<dyn EngineSession> = Box::new(DataFusionSession::open());
    if let Some(report) = run_engine(datafusion, &dataset, &suite, &runner).await {
        reports.push(report);
    }

    match DuckDbSession::open() {
        Ok(session) => {
            if let Some(report) = run_engine(Box::new(session), &dataset, &suite, &runner).await {
                reports.push(report);
            }
        }
        Err(e) => tracing::error!("Failed to open DuckDB session: {}", e),
    }

    BenchReport::combine(reports).render();

    Ok(())
}

/// Register the dataset and run the suite against one session.
///
/// Registration failure is fatal for this engine only. The session is closed
/// on every path; close failures are logged, not propagated.
async fn run_engine(
    mut session: Box<dyn EngineSession>,
    dataset: &DatasetLocation,
    suite: &QuerySuite,
    runner: &TimingRunner,
) -> Option<EngineReport> {
    let label = session.label().to_string();

    if let Err(e) = engine::register_dataset(session.as_mut(), dataset).await {
        tracing::error!(engine = %label, "Table registration failed: {}", e);
        if let Err(e) = session.close().await {
            tracing::warn!(engine = %label, "Session close failed: {}", e);
        }
        return None;
    }

    let report = runner.run(session.as_mut(), suite).await;

    if let Err(e) = session.close().await {
        tracing::warn!(engine = %label, "Session close failed: {}", e);
    }

    Some(report)
}
