//! Command line options for `pr-load`
use crate::config::BASE_URL_ENV;
use clap::Parser;
use prload::prelude::*;
use prload::{parse_duration, parse_rate, DEFAULT_VUS};
use std::num::{NonZeroU32, NonZeroU64, NonZeroUsize};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version, about = "Load test a team / pull-request service")]
pub struct Cli {
    /// Base URL of the service [default: http://localhost:8080]
    #[arg(long, env = BASE_URL_ENV)]
    pub base_url: Option<String>,

    /// Number of virtual users
    #[arg(short = 'u', long, default_value_t = DEFAULT_VUS)]
    pub vus: NonZeroUsize,

    /// Run length, e.g. `30s` or `2m`
    #[arg(short, long, default_value = "30s", value_parser = parse_duration)]
    pub duration: Duration,

    /// Stop after this many iterations across all virtual users
    #[arg(short, long)]
    pub iterations: Option<NonZeroU64>,

    /// Cap on requests per second across all virtual users
    #[arg(long)]
    pub rps: Option<NonZeroU32>,

    /// Time in-flight iterations get to finish once the run is over
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub graceful_stop: Duration,

    /// Exit with an error when fewer than this ratio of checks pass, e.g. `0.99`
    #[arg(long, value_parser = parse_rate)]
    pub min_check_rate: Option<f64>,
}

impl Cli {
    /// Apply the run options to `scenario`.
    pub fn configure<S: ConfigurableScenario<RunStatistics>>(&self, scenario: S) -> S {
        let mut scenario = scenario
            .vus(self.vus)
            .duration(self.duration)
            .graceful_stop(self.graceful_stop);

        if let Some(iterations) = self.iterations {
            scenario = scenario.iterations(iterations);
        }

        if let Some(rps) = self.rps {
            scenario = scenario.rps(rps);
        }

        scenario
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["pr-load"]).unwrap();
        assert_eq!(cli.vus.get(), 10);
        assert_eq!(cli.duration, Duration::from_secs(30));
        assert_eq!(cli.graceful_stop, Duration::from_secs(30));
        assert!(cli.iterations.is_none());
        assert!(cli.rps.is_none());
        assert!(cli.min_check_rate.is_none());
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "pr-load",
            "-u",
            "3",
            "-d",
            "1m 30s",
            "-i",
            "500",
            "--rps",
            "40",
            "--graceful-stop",
            "5s",
            "--min-check-rate",
            "0.99",
            "--base-url",
            "http://pr.internal:9000",
        ])
        .unwrap();

        assert_eq!(cli.vus.get(), 3);
        assert_eq!(cli.duration, Duration::from_secs(90));
        assert_eq!(cli.iterations.map(NonZeroU64::get), Some(500));
        assert_eq!(cli.rps.map(NonZeroU32::get), Some(40));
        assert_eq!(cli.graceful_stop, Duration::from_secs(5));
        assert_eq!(cli.min_check_rate, Some(0.99));
        assert_eq!(cli.base_url.as_deref(), Some("http://pr.internal:9000"));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Cli::try_parse_from(["pr-load", "-u", "0"]).is_err());
        assert!(Cli::try_parse_from(["pr-load", "-d", "0s"]).is_err());
        assert!(Cli::try_parse_from(["pr-load", "--min-check-rate", "2"]).is_err());
    }
}
