//! The team / pull-request iteration run by every virtual user
use crate::client::PrServiceClient;
use crate::model::{PullRequestCreate, TeamRegistration};
use prload::prelude::*;
use prload::Scenario;
use reqwest::StatusCode;
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, trace, warn};

pub const SCENARIO_NAME: &str = "pr_create_flow";

/// Name of the check recorded for every pull-request creation.
pub const PR_CREATED_CHECK: &str = "pr created";

/// Pause at the end of every iteration.
pub const ITERATION_PAUSE: Duration = Duration::from_millis(200);

/// `201 Created` or `409 Conflict` (the id already exists) both count as success.
pub fn accepted_status(status: StatusCode) -> bool {
    status == StatusCode::CREATED || status == StatusCode::CONFLICT
}

/// Run one iteration for `ctx`: register the VU's team, create this iteration's pull request,
/// check the creation status, then pause.
///
/// The team registration outcome is ignored. A pull-request creation that never gets a response
/// fails the check. Returns the check outcome.
pub async fn run_iteration(client: &PrServiceClient, ctx: VuContext) -> bool {
    let team = TeamRegistration::for_vu(ctx.vu);
    if let Err(err) = client.add_team(&team).await {
        debug!(vu = ctx.vu, "Team registration failed: {err}");
    }

    let pr = PullRequestCreate::for_iteration(ctx);
    let passed = match client.create_pull_request(&pr).await {
        Ok(status) => {
            trace!(%ctx, %status, "Created {}", pr.pull_request_id);
            accepted_status(status)
        }
        Err(err) => {
            debug!(%ctx, "Pull request creation failed: {err}");
            false
        }
    };
    check(PR_CREATED_CHECK, passed);

    tokio::time::sleep(ITERATION_PAUSE).await;
    passed
}

/// The load scenario against the service behind `client`.
pub fn pr_scenario(client: PrServiceClient) -> impl ConfigurableScenario<RunStatistics> {
    Scenario::new(SCENARIO_NAME, move |ctx: VuContext| {
        let client = client.clone();
        async move {
            run_iteration(&client, ctx).await;
        }
    })
}
