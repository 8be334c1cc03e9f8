//! Scenario logic and constants
use crate::executor::Executor;
use crate::timer::Timer;
use prload_core::{RunStatistics, ScenarioConfig, VuContext, SAMPLE_INTERVAL};
use std::{
    future::Future,
    num::{NonZeroU32, NonZeroU64, NonZeroUsize},
    pin::Pin,
    task::{Context, Poll},
    time::{Duration, Instant},
};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// Load test scenario structure
///
/// Handler for running scenarios. Either use the [`#[scenario]`](prload_macros::scenario) macro
/// which will add these methods to functions, or wrap a closure with [`Scenario::new`] when the
/// scenario needs to capture state such as an HTTP client.
#[pin_project::pin_project]
pub struct Scenario<T> {
    func: T,
    runner_fut: Option<Pin<Box<dyn Future<Output = RunStatistics> + Send>>>,
    config: ScenarioConfig,
}

impl<T> Scenario<T> {
    /// Create a scenario named `name` which calls `func` once per iteration.
    ///
    /// # Example
    /// ```no_run
    /// use prload::prelude::*;
    /// use prload::Scenario;
    /// use std::sync::Arc;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let target = Arc::new(String::from("http://localhost:8080"));
    ///     Scenario::new("captured", move |ctx: VuContext| {
    ///         let target = target.clone();
    ///         async move {
    ///             println!("{ctx} -> {target}");
    ///         }
    ///     })
    ///     .await;
    /// }
    /// ```
    pub fn new(name: &str, func: T) -> Self {
        Self {
            func,
            runner_fut: None,
            config: ScenarioConfig::new(name),
        }
    }
}

impl<T, F> Future for Scenario<T>
where
    T: Fn(VuContext) -> F + Send + 'static + Clone + Sync,
    F: Future<Output = ()> + Send + 'static,
{
    type Output = RunStatistics;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if this.runner_fut.is_none() {
            let func = this.func.clone();
            let config = this.config.clone();
            *this.runner_fut = Some(Box::pin(async move { run_scenario(func, config).await }));
        }

        if let Some(runner) = this.runner_fut {
            runner.as_mut().poll(cx)
        } else {
            unreachable!()
        }
    }
}

pub trait ConfigurableScenario<T: Send>: Future<Output = T> + Sized + Send {
    fn vus(self, vus: NonZeroUsize) -> Self;
    fn duration(self, duration: Duration) -> Self;
    fn iterations(self, iterations: NonZeroU64) -> Self;
    fn rps(self, rps: NonZeroU32) -> Self;
    fn graceful_stop(self, graceful_stop: Duration) -> Self;
}

impl<T, F> ConfigurableScenario<RunStatistics> for Scenario<T>
where
    T: Fn(VuContext) -> F + Send + 'static + Clone + Sync,
    F: Future<Output = ()> + Send + 'static,
{
    /// Run the scenario with the given number of virtual users (default 10).
    ///
    /// # Example
    /// ```no_run
    /// use prload::prelude::*;
    /// use std::num::NonZeroUsize;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     my_scenario()
    ///         .vus(NonZeroUsize::new(25).unwrap())
    ///         .await;
    /// }
    ///
    /// #[scenario]
    /// async fn my_scenario(ctx: VuContext) {
    /// }
    /// ```
    fn vus(mut self, vus: NonZeroUsize) -> Self {
        self.config.vus = vus;
        self
    }

    /// Run the scenario for the given duration (default 30s).
    ///
    /// Virtual users stop between iterations once the duration has elapsed.
    ///
    /// # Example
    /// ```no_run
    /// use prload::prelude::*;
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     my_scenario()
    ///         .duration(Duration::from_secs(120))
    ///         .await;
    /// }
    ///
    /// #[scenario]
    /// async fn my_scenario(ctx: VuContext) {
    /// }
    /// ```
    fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = duration;
        self
    }

    /// Stop after this many iterations in total, shared across all virtual users.
    ///
    /// The run still ends when the duration elapses, whichever comes first.
    ///
    /// # Example
    /// ```no_run
    /// use prload::prelude::*;
    /// use std::num::NonZeroU64;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     my_scenario()
    ///         .iterations(NonZeroU64::new(1_000).unwrap())
    ///         .await;
    /// }
    ///
    /// #[scenario]
    /// async fn my_scenario(ctx: VuContext) {
    /// }
    /// ```
    fn iterations(mut self, iterations: NonZeroU64) -> Self {
        self.config.iterations = Some(iterations);
        self
    }

    /// Limit transactions per second across all virtual users.
    ///
    /// # Example
    /// ```no_run
    /// use prload::prelude::*;
    /// use std::num::NonZeroU32;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     my_scenario()
    ///         .rps(NonZeroU32::new(50).unwrap())
    ///         .await;
    /// }
    ///
    /// #[scenario]
    /// async fn my_scenario(ctx: VuContext) {
    /// }
    /// ```
    fn rps(mut self, rps: NonZeroU32) -> Self {
        self.config.rps = Some(rps);
        self
    }

    /// How long in-flight iterations may continue once the run is over (default 30s). Virtual
    /// users still running afterwards are aborted and reported as interrupted.
    fn graceful_stop(mut self, graceful_stop: Duration) -> Self {
        self.config.graceful_stop = graceful_stop;
        self
    }
}

#[instrument(name="scenario", skip_all, fields(name=config.name))]
pub(crate) async fn run_scenario<T, F>(scenario: T, config: ScenarioConfig) -> RunStatistics
where
    T: Fn(VuContext) -> F + Send + Sync + 'static + Clone,
    F: Future<Output = ()> + Send + 'static,
{
    info!("Running {} with config {:?}", config.name, &config);

    let start = Instant::now();

    let mut executor = Executor::new(scenario, &config);
    executor.spawn_vus(config.vus.get());

    let mut timer = Timer::new(SAMPLE_INTERVAL).await;
    debug!("Sampling progress every {timer}");
    let deadline = tokio::time::sleep(config.duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            elapsed = timer.tick() => {
                let measurement = executor.collect(elapsed);
                info!("{measurement}");
            }
            _ = &mut deadline => {
                debug!("Duration of {} elapsed", humantime::format_duration(config.duration));
                break;
            }
            _ = executor.idle() => {
                debug!("All virtual users finished before the duration elapsed");
                break;
            }
        }
    }

    let interrupted = executor.shutdown(config.graceful_stop).await;
    let stats = executor.statistics(&config, start.elapsed(), interrupted);

    info!(
        "Scenario complete: {} iterations in {}",
        stats.iterations,
        humantime::format_duration(Duration::from_millis(stats.elapsed.as_millis() as u64)),
    );

    stats
}
