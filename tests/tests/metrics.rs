mod utils;
use utils::*;

use prload::prelude::*;
use std::num::{NonZeroU64, NonZeroUsize};
use std::time::Duration;

#[tokio::test]
async fn scenario_emits_prometheus_metrics() {
    init();

    let stats = exported_scenario()
        .vus(NonZeroUsize::new(2).unwrap())
        .iterations(NonZeroU64::new(6).unwrap())
        .duration(Duration::from_secs(30))
        .await;
    assert_eq!(stats.iterations, 6);

    let rendered = metrics_handle().render();

    assert!(
        rendered.contains(r#"checks_passed{check="exported even"} 3"#),
        "{rendered}"
    );
    assert!(
        rendered.contains(r#"checks_failed{check="exported even"} 3"#),
        "{rendered}"
    );
    assert!(rendered.contains("exported_call_success 6"), "{rendered}");
    assert!(rendered.contains("exported_failing_call_error 6"), "{rendered}");
    assert!(rendered.contains("exported_call_latency"), "{rendered}");
    assert!(rendered.contains("iterations"), "{rendered}");
}

#[scenario]
async fn exported_scenario(_ctx: VuContext) {
    let _ = exported_call().await;
    let _ = exported_failing_call().await;
    // Iterations are numbered per virtual user, so key the check off a per-run counter.
    check("exported even", next_even());
}

fn next_even() -> bool {
    use std::sync::atomic::{AtomicU64, Ordering};
    static CALLS: AtomicU64 = AtomicU64::new(0);
    CALLS.fetch_add(1, Ordering::Relaxed) % 2 == 0
}

#[transaction]
async fn exported_call() -> Result<(), std::io::Error> {
    tokio::time::sleep(Duration::from_millis(1)).await;
    Ok(())
}

#[transaction]
async fn exported_failing_call() -> Result<(), std::io::Error> {
    Err(std::io::Error::other("rejected"))
}
