//! Command-line interface for the earnings analyst

mod boundary;
mod loader;

use analyst_judgment::{HeuristicJudgment, HttpJudgment, JudgmentProvider};
use analyst_pipeline::{Coordinator, RetryPolicy};
use analyst_utils::AnalysisSettings;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "analyst-cli")]
#[command(about = "Deterministic earnings report analysis", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze an earnings report file and print the report as JSON
    Analyze {
        /// Path to the report text file
        path: PathBuf,
    },
    /// List the analysis agents
    Agents,
    /// Check the judgment provider
    Health,
}

/// An HTTP-backed provider when credentials are configured, the built-in
/// deterministic analyst otherwise
fn select_provider() -> anyhow::Result<Arc<dyn JudgmentProvider>> {
    if std::env::var("JUDGMENT_API_KEY").is_ok() {
        let provider = HttpJudgment::from_env()?;
        info!(provider = provider.name(), "Using HTTP judgment provider");
        Ok(Arc::new(provider))
    } else {
        info!("Using built-in heuristic judgment provider");
        Ok(Arc::new(HeuristicJudgment::new()))
    }
}

fn build_coordinator(provider: Arc<dyn JudgmentProvider>) -> anyhow::Result<Coordinator> {
    let settings = AnalysisSettings::from_env()?;
    let retry = RetryPolicy::new(
        settings.max_attempts,
        settings.retry_backoff_base,
        Duration::from_secs(10),
        2.0,
    );
    Ok(Coordinator::new(provider)
        .retry_policy(retry)
        .stage_timeout(settings.stage_timeout))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    analyst_utils::init_tracing();

    let args = Args::parse();
    match args.command {
        Command::Analyze { path } => {
            let text = loader::load_report(&path).await?;
            let provider = select_provider()?;
            let coordinator = build_coordinator(provider)?;
            let report = boundary::run_analysis(&coordinator, &text).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Agents => {
            println!("{}", serde_json::to_string_pretty(&boundary::agents())?);
        }
        Command::Health => {
            let provider = select_provider()?;
            let status = boundary::health(provider.as_ref()).await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
