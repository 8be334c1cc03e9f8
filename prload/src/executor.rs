use crate::check::CheckRegistry;
use crate::measurement::{LatencyDigest, Measurement};
use crate::transaction::{RunHook, RUN_HOOK};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use metrics_util::AtomicBucket;
use prload_core::{RunStatistics, ScenarioConfig, VuContext};
use std::future::Future;
use std::num::{NonZeroU32, NonZeroU64};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Runs a fixed set of virtual users, each calling the scenario in a loop.
pub(crate) struct Executor<T> {
    scenario: T,
    tasks: Vec<JoinHandle<()>>,
    atomics: RunAtomics,
    control: Arc<VuControl>,
}

impl<T, F> Executor<T>
where
    T: Fn(VuContext) -> F + Send + Sync + 'static + Clone,
    F: Future<Output = ()> + Send + 'static,
{
    pub fn new(scenario: T, config: &ScenarioConfig) -> Self {
        Self {
            scenario,
            tasks: vec![],
            atomics: RunAtomics::new(config.rps),
            control: Arc::new(VuControl {
                stop: AtomicBool::new(false),
                budget: IterationBudget::new(config.iterations),
                running: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    pub fn spawn_vus(&mut self, count: usize) {
        while self.tasks.len() < count {
            let vu = self.tasks.len() as u64 + 1;
            self.spawn_vu(vu);
        }
        debug!("Spawned {count} virtual users");
    }

    fn spawn_vu(&mut self, vu: u64) {
        let scenario = self.scenario.clone();
        let control = self.control.clone();
        let iterations = self.atomics.iterations.clone();
        let hook = self.atomics.clone_to_hook();

        control.running.fetch_add(1, Ordering::AcqRel);
        self.tasks.push(tokio::spawn(RUN_HOOK.scope(hook, async move {
            let _running = RunningGuard(control.clone());

            // NOTE: The stop flag is only observed between iterations.
            let mut iteration = 0;
            while !control.stop.load(Ordering::Acquire) && control.budget.claim() {
                scenario(VuContext::new(vu, iteration)).await;
                iteration += 1;
                iterations.fetch_add(1, Ordering::Relaxed);

                #[cfg(feature = "metrics")]
                metrics::counter!(prload_core::ITERATIONS).increment(1);
            }

            trace!(vu, iterations = iteration, "Virtual user finished");
        })));
    }

    /// Resolves once every virtual user has left its loop.
    ///
    /// Only the `Notify` is borrowed, so the returned future stays `Send` while the executor's
    /// digest totals are not `Sync`.
    pub fn idle(&self) -> Notified<'_> {
        self.control.idle.notified()
    }

    pub fn collect(&mut self, elapsed: Duration) -> Measurement {
        self.atomics.collect(elapsed)
    }

    /// Signal every virtual user to stop, then wait up to `grace` for in-flight iterations.
    ///
    /// Returns the number of virtual users aborted mid-iteration.
    pub async fn shutdown(&mut self, grace: Duration) -> u64 {
        self.control.stop.store(true, Ordering::Release);

        let deadline = Instant::now() + grace;
        let mut interrupted = 0;
        for mut handle in self.tasks.drain(..) {
            match timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => error!("Virtual user task failed: {err}"),
                Err(_) => {
                    handle.abort();
                    interrupted += 1;
                }
            }
        }

        if interrupted > 0 {
            warn!(
                "{interrupted} iterations interrupted after a graceful stop of {}",
                humantime::format_duration(grace)
            );
        }

        interrupted
    }

    pub fn statistics(
        mut self,
        config: &ScenarioConfig,
        elapsed: Duration,
        interrupted_iterations: u64,
    ) -> RunStatistics {
        // Fold anything recorded since the last sample into the totals.
        let _ = self.atomics.collect(Duration::ZERO);
        let totals = &self.atomics.totals;

        RunStatistics {
            name: config.name.clone(),
            vus: config.vus.get(),
            elapsed,
            iterations: totals.iterations,
            interrupted_iterations,
            transactions_ok: totals.success,
            transactions_err: totals.error,
            latency_p50: totals.latency.quantile(0.5),
            latency_p90: totals.latency.quantile(0.9),
            latency_p99: totals.latency.quantile(0.99),
            checks: self.atomics.checks.summary(),
        }
    }
}

impl<T> Drop for Executor<T> {
    fn drop(&mut self) {
        for handle in &self.tasks {
            handle.abort();
        }
    }
}

struct VuControl {
    stop: AtomicBool,
    budget: IterationBudget,
    running: AtomicUsize,
    idle: Notify,
}

struct RunningGuard(Arc<VuControl>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        if self.0.running.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_one();
        }
    }
}

/// Total iteration allowance shared by all virtual users.
pub(crate) struct IterationBudget {
    remaining: Option<AtomicU64>,
}

impl IterationBudget {
    pub fn new(limit: Option<NonZeroU64>) -> Self {
        Self {
            remaining: limit.map(|n| AtomicU64::new(n.get())),
        }
    }

    pub fn claim(&self) -> bool {
        match &self.remaining {
            None => true,
            Some(remaining) => remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_ok(),
        }
    }
}

#[derive(Default)]
struct Totals {
    iterations: u64,
    success: u64,
    error: u64,
    latency: LatencyDigest,
}

pub(crate) struct RunAtomics {
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    iterations: Arc<AtomicU64>,
    success: Arc<AtomicU64>,
    error: Arc<AtomicU64>,
    latency: Arc<AtomicBucket<Duration>>,
    checks: Arc<CheckRegistry>,
    totals: Totals,
}

impl RunAtomics {
    pub fn new(rps: Option<NonZeroU32>) -> Self {
        Self {
            limiter: rps.map(|rps| Arc::new(rate_limiter(rps))),
            iterations: Arc::new(AtomicU64::new(0)),
            success: Arc::new(AtomicU64::new(0)),
            error: Arc::new(AtomicU64::new(0)),
            latency: Arc::new(AtomicBucket::new()),
            checks: Arc::new(CheckRegistry::default()),
            totals: Totals::default(),
        }
    }

    pub fn clone_to_hook(&self) -> RunHook {
        RunHook {
            limiter: self.limiter.clone(),
            success: self.success.clone(),
            error: self.error.clone(),
            latency: self.latency.clone(),
            checks: self.checks.clone(),
        }
    }

    pub fn collect(&mut self, elapsed: Duration) -> Measurement {
        let iterations = self.iterations.swap(0, Ordering::Relaxed);
        let success = self.success.swap(0, Ordering::Relaxed);
        let error = self.error.swap(0, Ordering::Relaxed);

        let mut measurement = Measurement::new(iterations, success, error, elapsed);
        let totals = &mut self.totals;
        self.latency.clear_with(|dur| {
            measurement.populate_latencies(dur);
            totals.latency.insert_all(dur);
        });

        totals.iterations += iterations;
        totals.success += success;
        totals.error += error;

        measurement
    }
}

fn rate_limiter(rps: NonZeroU32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(rps).allow_burst(NonZeroU32::MIN))
}
