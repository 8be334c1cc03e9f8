use crate::check::CheckRegistry;
use governor::DefaultDirectRateLimiter;
use metrics_util::AtomicBucket;
use prload_core::TransactionLabels;
use std::time::{Duration, Instant};
use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// Transaction hook used by the `#[transaction]` macro. Not intended to be used manually.
pub async fn transaction_hook<T, R, E>(labels: TransactionLabels, func: T) -> T::Output
where
    T: Future<Output = Result<R, E>>,
{
    if let Ok(hook) = RUN_HOOK.try_with(|v| v.clone()) {
        if let Some(limiter) = &hook.limiter {
            limiter.until_ready().await;
        }

        let start = Instant::now();
        let res = func.await;
        let elapsed = start.elapsed();

        hook.latency.push(elapsed);

        #[cfg(feature = "metrics")]
        metrics::histogram!(labels.latency).record(elapsed.as_secs_f64());

        if res.is_ok() {
            hook.success.fetch_add(1, Ordering::Relaxed);

            #[cfg(feature = "metrics")]
            metrics::counter!(labels.success).increment(1);
        } else {
            hook.error.fetch_add(1, Ordering::Relaxed);

            #[cfg(feature = "metrics")]
            metrics::counter!(labels.error).increment(1);
        }

        res
    } else {
        tracing::warn!(
            "Transaction `{}` called outside of a running scenario.",
            labels.latency.trim_end_matches("_latency")
        );
        func.await
    }
}

/// Shared run state handed to every virtual user task.
#[derive(Clone)]
pub(crate) struct RunHook {
    pub limiter: Option<Arc<DefaultDirectRateLimiter>>,
    pub success: Arc<AtomicU64>,
    pub error: Arc<AtomicU64>,
    pub latency: Arc<AtomicBucket<Duration>>,
    pub checks: Arc<CheckRegistry>,
}

tokio::task_local! {
    pub(crate) static RUN_HOOK: RunHook;
}
