use clap::Parser;
use pr_scenarios::cli::Cli;
use pr_scenarios::{pr_scenario, resolve_base_url, PrServiceClient};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_LOG_FILTER: &str = "prload=info,pr_scenarios=info";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let base_url = resolve_base_url(cli.base_url.as_deref())?;
    info!("Targeting {base_url}");

    let stats = cli
        .configure(pr_scenario(PrServiceClient::new(base_url)))
        .await;

    println!("{stats}");

    if let Some(min_check_rate) = cli.min_check_rate {
        if !stats.meets(min_check_rate) {
            error!(
                "Check pass rate {:.2}% is below the {:.2}% threshold",
                stats.check_pass_rate() * 100.,
                min_check_rate * 100.
            );
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}
