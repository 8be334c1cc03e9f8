mod utils;
use utils::*;

use prload::prelude::*;
use std::collections::HashSet;
use std::num::{NonZeroU32, NonZeroU64, NonZeroUsize};
use std::sync::Mutex;
use std::time::Duration;

static SEEN: Mutex<Vec<(u64, u64)>> = Mutex::new(Vec::new());

#[tokio::test]
async fn scenario_macro_runs_transactions() {
    init();

    let stats = counting_scenario()
        .vus(NonZeroUsize::new(4).unwrap())
        .iterations(NonZeroU64::new(20).unwrap())
        .duration(Duration::from_secs(30))
        .await;

    assert_eq!(stats.name, "counting_scenario");
    assert_eq!(stats.iterations, 20);
    assert_eq!(stats.interrupted_iterations, 0);
    // One ok transaction per iteration plus a failing one on even iterations.
    assert_eq!(stats.transactions_ok, 20);
    assert!(stats.transactions_err > 0 && stats.transactions_err < 20);
    assert!(stats.error_rate() > 0.);

    let seen = SEEN.lock().unwrap().clone();
    assert_eq!(seen.len(), 20);
    assert!(seen.iter().all(|(vu, _)| (1..=4).contains(vu)));
    let unique: HashSet<_> = seen.iter().collect();
    assert_eq!(unique.len(), seen.len());

    let in_range = stats.check("vu in range").unwrap();
    assert_eq!((in_range.passes, in_range.fails), (20, 0));
}

#[scenario]
async fn counting_scenario(ctx: VuContext) {
    SEEN.lock().unwrap().push((ctx.vu, ctx.iteration));
    check("vu in range", (1..=4).contains(&ctx.vu));

    let _ = succeeding_call(ctx.iteration).await;
    if ctx.iteration % 2 == 0 {
        let _ = failing_call().await;
    }
}

#[transaction]
async fn succeeding_call(iteration: u64) -> Result<u64, std::io::Error> {
    tokio::time::sleep(Duration::from_millis(1)).await;
    Ok(iteration)
}

#[transaction]
async fn failing_call() -> Result<(), std::io::Error> {
    Err(std::io::Error::other("refused"))
}

#[tokio::test]
async fn limited_scenario_stays_under_rate() {
    init();

    let stats = paced_scenario()
        .vus(NonZeroUsize::new(8).unwrap())
        .rps(NonZeroU32::new(10).unwrap())
        .duration(Duration::from_secs(1))
        .await;

    assert!(stats.transactions_ok >= 5, "{stats}");
    // Virtual users blocked on the limiter at stop still finish their iteration.
    assert!(stats.transactions_ok <= 24, "{stats}");
    assert_eq!(stats.transactions_err, 0);
}

#[scenario]
async fn paced_scenario(_ctx: VuContext) {
    let _ = succeeding_call(0).await;
}
