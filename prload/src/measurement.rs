use pdatastructs::tdigest::{TDigest, K1};
use std::fmt;
use std::time::Duration;
use tracing::error;

const TDIGEST_BACKLOG_SIZE: usize = 100;

/// Transaction latencies summarized as a t-digest.
#[derive(Debug, Clone)]
pub(crate) struct LatencyDigest {
    digest: TDigest<K1>,
    count: u64,
}

impl LatencyDigest {
    pub fn new() -> Self {
        Self {
            digest: TDigest::new(K1::new(10.), TDIGEST_BACKLOG_SIZE),
            count: 0,
        }
    }

    pub fn insert_all(&mut self, latencies: &[Duration]) {
        for latency in latencies {
            self.digest.insert(latency.as_secs_f64());
        }
        self.count += latencies.len() as u64;
    }

    pub fn quantile(&self, quantile: f64) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }

        let secs = self.digest.quantile(quantile);

        // NOTE: TDigest can return NaN for degenerate inputs.
        let secs = if secs.is_finite() {
            secs.max(0.)
        } else {
            error!("NaN latency calculation, reporting zero.");
            0.
        };

        Duration::from_secs_f64(secs)
    }
}

impl Default for LatencyDigest {
    fn default() -> Self {
        Self::new()
    }
}

/// A single progress sample covering one sampling interval.
#[derive(Debug, Clone)]
pub(crate) struct Measurement {
    pub iterations: u64,
    pub success: u64,
    pub error: u64,
    pub elapsed: Duration,
    latency: LatencyDigest,
}

impl Measurement {
    pub fn new(iterations: u64, success: u64, error: u64, elapsed: Duration) -> Self {
        Self {
            iterations,
            success,
            error,
            elapsed,
            latency: LatencyDigest::new(),
        }
    }

    pub fn populate_latencies(&mut self, dur: &[Duration]) {
        self.latency.insert_all(dur);
    }

    pub fn iterations_per_second(&self) -> f64 {
        per_second(self.iterations, self.elapsed)
    }

    pub fn tps(&self) -> f64 {
        per_second(self.success + self.error, self.elapsed)
    }

    pub fn error_rate(&self) -> f64 {
        let total = self.success + self.error;
        if total == 0 {
            0.
        } else {
            self.error as f64 / total as f64
        }
    }

    pub fn latency(&self, quantile: f64) -> Duration {
        self.latency.quantile(quantile)
    }
}

fn per_second(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0. {
        count as f64 / secs
    } else {
        0.
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IPS={:.2}, TPS={:.2}, ErrorRate={:.2}, p50={:?}, p90={:?}, p99={:?}",
            self.iterations_per_second(),
            self.tps(),
            self.error_rate(),
            self.latency(0.5),
            self.latency(0.90),
            self.latency(0.99),
        )
    }
}
