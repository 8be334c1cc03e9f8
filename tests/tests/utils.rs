use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use mock_service::MockService;
use pr_scenarios::{resolve_base_url, PrServiceClient};
use std::sync::OnceLock;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

static ONCE_LOCK: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

fn init_once() -> &'static Option<PrometheusHandle> {
    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        let _ = FmtSubscriber::builder()
            .with_env_filter("prload=debug,pr_scenarios=debug,mock_service=debug")
            .with_test_writer()
            .try_init();

        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(err) => {
                error!("Unable to install metrics recorder: {err}");
                None
            }
        }
    })
}

#[allow(unused)]
pub fn init() {
    init_once();
}

/// Handle onto the process-wide Prometheus recorder installed by [`init`].
#[allow(unused)]
pub fn metrics_handle() -> &'static PrometheusHandle {
    init_once()
        .as_ref()
        .expect("Prometheus recorder is not installed")
}

/// Serve `service` on an ephemeral port and return a client pointed at it.
#[allow(unused)]
pub async fn client_for(service: &MockService) -> PrServiceClient {
    let addr = mock_service::spawn(service.clone())
        .await
        .expect("mock service failed to bind");
    let base_url = resolve_base_url(Some(&format!("http://{addr}"))).expect("valid base URL");
    PrServiceClient::new(base_url)
}
