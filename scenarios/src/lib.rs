//! Load scenario for a team / pull-request service.
//!
//! Every virtual user registers its team (`team-{vu}`) and creates one pull request per iteration
//! (`pr-{vu}-{iteration}`), checking that creation answers `201` or `409`.
pub mod cli;
pub mod client;
pub mod config;
pub mod flow;
pub mod model;

pub use client::{ClientError, PrServiceClient};
pub use config::{resolve_base_url, ConfigError};
pub use flow::{pr_scenario, run_iteration, PR_CREATED_CHECK};
