use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use mock_service::{request_rate_task, run, MockService, StatusCode, DEFAULT_ADDR};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_service=info,tower_http=info")),
        )
        .init();

    let addr: SocketAddr = std::env::var("MOCK_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .context("MOCK_ADDR is not a socket address")?;

    if let Ok(raw) = std::env::var("MOCK_METRICS_ADDR") {
        let metrics_addr: SocketAddr = raw
            .parse()
            .with_context(|| format!("MOCK_METRICS_ADDR `{raw}` is not a socket address"))?;
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()
            .context("Unable to install Prometheus exporter")?;
        info!("Serving Prometheus metrics on {metrics_addr}");
    }

    let service = match std::env::var("MOCK_MAX_RPS") {
        Ok(raw) => {
            let max_rps: NonZeroU32 = raw
                .parse()
                .with_context(|| format!("MOCK_MAX_RPS `{raw}` is not a positive integer"))?;
            info!("Limiting /pullRequest/create to {max_rps} requests/s");
            MockService::with_rate_limit(max_rps)
        }
        Err(_) => MockService::new(),
    };
    if let Ok(raw) = std::env::var("MOCK_FAULT_STATUS") {
        let status = raw
            .parse::<u16>()
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .with_context(|| format!("MOCK_FAULT_STATUS `{raw}` is not an HTTP status"))?;
        info!("Answering /pullRequest/create with {status}");
        service.set_fault(Some(status));
    }

    tokio::task::spawn(request_rate_task(service.clone()));

    info!("Serving team / pull-request mock on {addr}");
    run(addr, service).await?;
    Ok(())
}
