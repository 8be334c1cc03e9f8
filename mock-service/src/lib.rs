use axum::{
    debug_handler,
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use metrics::counter;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::{
    atomic::{AtomicU16, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

mod error;
mod model;
mod store;

pub use axum::http::StatusCode;
pub use error::ApiError;
pub use model::*;
pub use store::Store;

pub mod prelude {
    pub use crate::{run, spawn, Endpoint, MockService, StatusCode};
}

/// Address the standalone binary binds when `MOCK_ADDR` is unset.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    TeamAdd,
    TeamGet,
    PullRequestCreate,
}

impl Endpoint {
    fn label(self) -> &'static str {
        match self {
            Endpoint::Health => "healthz",
            Endpoint::TeamAdd => "team_add",
            Endpoint::TeamGet => "team_get",
            Endpoint::PullRequestCreate => "pull_request_create",
        }
    }
}

#[derive(Default)]
struct RequestCounters {
    health: AtomicU64,
    team_add: AtomicU64,
    team_get: AtomicU64,
    pull_request_create: AtomicU64,
}

impl RequestCounters {
    fn get(&self, endpoint: Endpoint) -> &AtomicU64 {
        match endpoint {
            Endpoint::Health => &self.health,
            Endpoint::TeamAdd => &self.team_add,
            Endpoint::TeamGet => &self.team_get,
            Endpoint::PullRequestCreate => &self.pull_request_create,
        }
    }
}

#[derive(Default)]
struct Inner {
    store: Mutex<Store>,
    fault: AtomicU16,
    limiter: Option<DefaultDirectRateLimiter>,
    counters: RequestCounters,
}

/// In-memory team / pull-request service. Cloning shares the same state.
#[derive(Clone, Default)]
pub struct MockService {
    inner: Arc<Inner>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `429 Too Many Requests` once `/pullRequest/create` exceeds `max_rps`.
    pub fn with_rate_limit(max_rps: NonZeroU32) -> Self {
        Self {
            inner: Arc::new(Inner {
                limiter: Some(RateLimiter::direct(Quota::per_second(max_rps))),
                ..Default::default()
            }),
        }
    }

    /// Answer every `/pullRequest/create` with `status` instead of the normal behaviour.
    pub fn with_fault(self, status: StatusCode) -> Self {
        self.set_fault(Some(status));
        self
    }

    pub fn set_fault(&self, status: Option<StatusCode>) {
        let raw = status.map(|s| s.as_u16()).unwrap_or(0);
        self.inner.fault.store(raw, Ordering::Relaxed);
    }

    fn fault(&self) -> Option<StatusCode> {
        match self.inner.fault.load(Ordering::Relaxed) {
            0 => None,
            raw => StatusCode::from_u16(raw).ok(),
        }
    }

    pub fn requests(&self, endpoint: Endpoint) -> u64 {
        self.inner.counters.get(endpoint).load(Ordering::Relaxed)
    }

    pub fn total_requests(&self) -> u64 {
        [
            Endpoint::Health,
            Endpoint::TeamAdd,
            Endpoint::TeamGet,
            Endpoint::PullRequestCreate,
        ]
        .into_iter()
        .map(|e| self.requests(e))
        .sum()
    }

    pub fn team(&self, name: &str) -> Option<Team> {
        self.store().ok()?.team(name).ok()
    }

    pub fn pull_request(&self, id: &str) -> Option<PullRequest> {
        self.store().ok()?.pull_request(id).cloned()
    }

    pub fn pull_request_count(&self) -> usize {
        self.store().map(|s| s.pull_request_count()).unwrap_or(0)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/healthz", get(healthz))
            .route("/team/add", post(team_add))
            .route("/team/get", get(team_get))
            .route("/pullRequest/create", post(pull_request_create))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>, ApiError> {
        self.inner.store.lock().map_err(|_| ApiError::Poisoned)
    }

    fn count(&self, endpoint: Endpoint) {
        self.inner
            .counters
            .get(endpoint)
            .fetch_add(1, Ordering::Relaxed);
        counter!("mock-service.requests", "endpoint" => endpoint.label()).increment(1);
    }
}

/// Serve `service` on `addr` until the listener fails.
pub async fn run(addr: SocketAddr, service: MockService) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, service.router()).await
}

/// Serve `service` on an ephemeral localhost port in the background.
pub async fn spawn(service: MockService) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = service.router();

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!("Mock service on {addr} stopped: {err}");
        }
    });

    debug!("Mock service listening on {addr}");
    Ok(addr)
}

#[debug_handler]
async fn healthz(State(service): State<MockService>) -> &'static str {
    service.count(Endpoint::Health);
    "ok"
}

#[debug_handler]
async fn team_add(
    State(service): State<MockService>,
    payload: Result<Json<Team>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    service.count(Endpoint::TeamAdd);
    let Json(team) = payload.map_err(|err| ApiError::BadRequest(err.body_text()))?;

    let team = service.store()?.create_team(team)?;
    Ok((StatusCode::CREATED, Json(json!({ "team": team }))))
}

#[derive(Debug, Deserialize)]
struct TeamQuery {
    team_name: String,
}

#[debug_handler]
async fn team_get(
    State(service): State<MockService>,
    query: Option<Query<TeamQuery>>,
) -> Result<Json<Team>, ApiError> {
    service.count(Endpoint::TeamGet);
    let Some(team_name) = query
        .map(|Query(query)| query.team_name)
        .filter(|name| !name.is_empty())
    else {
        return Err(ApiError::BadRequest("team_name required".to_string()));
    };

    Ok(Json(service.store()?.team(&team_name)?))
}

#[debug_handler]
async fn pull_request_create(
    State(service): State<MockService>,
    payload: Result<Json<CreatePullRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    service.count(Endpoint::PullRequestCreate);
    if let Some(status) = service.fault() {
        return Err(ApiError::Injected(status));
    }
    if let Some(limiter) = &service.inner.limiter {
        if limiter.check().is_err() {
            debug!("Rate limit exceeded");
            return Err(ApiError::RateLimited);
        }
    }

    let Json(req) = payload.map_err(|err| ApiError::BadRequest(err.body_text()))?;
    let pr = service
        .store()?
        .create_pull_request(req, &mut rand::thread_rng())?;
    Ok((StatusCode::CREATED, Json(json!({ "pr": pr }))))
}

/** Request rate printer **/

pub async fn request_rate_task(service: MockService) {
    let mut last = service.total_requests();
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let total = service.total_requests();
        info!("{} requests/s", total - last);
        last = total;
    }
}
