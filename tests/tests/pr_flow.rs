mod utils;
use utils::*;

use mock_service::prelude::*;
use mock_service::Team;
use pr_scenarios::client::PrServiceClient;
use pr_scenarios::flow::ITERATION_PAUSE;
use pr_scenarios::model::PullRequestCreate;
use pr_scenarios::{resolve_base_url, run_iteration, PR_CREATED_CHECK};
use prload::prelude::*;
use std::num::{NonZeroU64, NonZeroUsize};
use std::time::{Duration, Instant};

#[tokio::test]
async fn created_pull_request_passes() {
    init();
    let service = MockService::new();
    let client = client_for(&service).await;

    assert!(run_iteration(&client, VuContext::new(4, 0)).await);

    assert_eq!(service.requests(Endpoint::TeamAdd), 1);
    assert_eq!(service.requests(Endpoint::PullRequestCreate), 1);

    let team = service.team("team-4").unwrap();
    let ids: Vec<_> = team.members.iter().map(|m| m.user_id.as_str()).collect();
    assert_eq!(ids, ["u4-1", "u4-2", "u4-3"]);

    let pr = service.pull_request("pr-4-0").unwrap();
    assert_eq!(pr.pull_request_name, "Load Test");
    assert_eq!(pr.author_id, "u4-1");
    let mut reviewers = pr.assigned_reviewers.clone();
    reviewers.sort();
    assert_eq!(reviewers, ["u4-2", "u4-3"]);
}

#[tokio::test]
async fn repeated_pull_request_conflict_passes() {
    init();
    let service = MockService::new();
    let client = client_for(&service).await;
    let ctx = VuContext::new(2, 7);

    assert!(run_iteration(&client, ctx).await);
    assert!(run_iteration(&client, ctx).await);

    let status = client
        .create_pull_request(&PullRequestCreate::for_iteration(ctx))
        .await
        .unwrap();
    assert_eq!(status.as_u16(), 409);
    assert_eq!(service.pull_request_count(), 1);
}

#[tokio::test]
async fn server_error_fails_and_still_pauses() {
    init();
    let service = MockService::new().with_fault(StatusCode::INTERNAL_SERVER_ERROR);
    let client = client_for(&service).await;

    let start = Instant::now();
    assert!(!run_iteration(&client, VuContext::new(1, 0)).await);
    assert!(start.elapsed() >= ITERATION_PAUSE);

    // The team registration is unaffected and was still sent.
    assert_eq!(service.requests(Endpoint::TeamAdd), 1);
    assert!(service.team("team-1").is_some());
}

#[tokio::test]
async fn unreachable_service_fails() {
    init();
    // Bind and immediately drop a listener so nothing is serving on the port.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = PrServiceClient::new(resolve_base_url(Some(&format!("http://{addr}"))).unwrap());

    let start = Instant::now();
    assert!(!run_iteration(&client, VuContext::new(1, 0)).await);
    assert!(start.elapsed() >= ITERATION_PAUSE);
}

#[tokio::test]
async fn team_registration_conflicts_are_ignored() {
    init();
    let service = MockService::new();
    let client = client_for(&service).await;

    for iteration in 0..3 {
        assert!(run_iteration(&client, VuContext::new(5, iteration)).await);
    }

    // Only the first registration succeeds; later ones answer 400 TEAM_EXISTS.
    assert_eq!(service.requests(Endpoint::TeamAdd), 3);
    assert_eq!(service.pull_request_count(), 3);
}

#[tokio::test]
async fn timed_run_creates_one_pull_request_per_iteration() -> anyhow::Result<()> {
    init();
    let service = MockService::new();
    let client = client_for(&service).await;

    let stats = pr_scenarios::pr_scenario(client)
        .vus(NonZeroUsize::new(3).unwrap())
        .duration(Duration::from_secs(1))
        .await;

    assert_eq!(stats.vus, 3);
    assert!(stats.iterations >= 3, "{stats}");
    assert_eq!(stats.interrupted_iterations, 0);
    assert_eq!(stats.check_pass_rate(), 1.);

    let created = stats.check(PR_CREATED_CHECK).unwrap();
    assert_eq!(created.passes, stats.iterations);
    assert_eq!(service.requests(Endpoint::TeamAdd), stats.iterations);
    assert_eq!(service.pull_request_count() as u64, stats.iterations);

    // One team per virtual user, one transaction pair per iteration.
    for vu in 1..=3 {
        assert!(service.team(&format!("team-{vu}")).is_some());
    }
    assert_eq!(stats.transactions_ok + stats.transactions_err, stats.iterations * 2);
    Ok(())
}

#[tokio::test]
async fn iteration_budget_is_shared_between_vus() {
    init();
    let service = MockService::new();
    let client = client_for(&service).await;

    let stats = pr_scenarios::pr_scenario(client)
        .vus(NonZeroUsize::new(2).unwrap())
        .iterations(NonZeroU64::new(5).unwrap())
        .duration(Duration::from_secs(30))
        .await;

    assert_eq!(stats.iterations, 5);
    assert_eq!(service.pull_request_count(), 5);
    // Three rounds of pauses for the busier virtual user.
    assert!(stats.elapsed >= ITERATION_PAUSE * 3);
    assert!(stats.elapsed < Duration::from_secs(30));
}

#[tokio::test]
async fn failing_service_misses_threshold() {
    init();
    let service = MockService::new().with_fault(StatusCode::SERVICE_UNAVAILABLE);
    let client = client_for(&service).await;

    let stats = pr_scenarios::pr_scenario(client)
        .vus(NonZeroUsize::new(2).unwrap())
        .iterations(NonZeroU64::new(4).unwrap())
        .await;

    let created = stats.check(PR_CREATED_CHECK).unwrap();
    assert_eq!((created.passes, created.fails), (0, 4));
    assert_eq!(stats.check_pass_rate(), 0.);
    assert!(!stats.meets(0.9));
    assert!(stats.to_string().contains("✗ pr created"));
}

#[tokio::test]
async fn registered_team_is_served_over_http() {
    init();
    let service = MockService::new();
    let addr = spawn(service.clone()).await.unwrap();
    let client = PrServiceClient::new(resolve_base_url(Some(&format!("http://{addr}"))).unwrap());

    assert!(run_iteration(&client, VuContext::new(9, 0)).await);

    let health = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
    assert_eq!(health.status().as_u16(), 200);
    assert_eq!(health.text().await.unwrap(), "ok");

    let team: Team = reqwest::get(format!("http://{addr}/team/get?team_name=team-9"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(team.team_name, "team-9");
    assert!(team.members.iter().all(|m| m.is_active));
    assert_eq!(service.requests(Endpoint::Health), 1);
}
