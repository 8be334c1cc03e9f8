#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod check;
pub mod scenario;
#[doc(hidden)]
pub mod transaction;

pub(crate) mod executor;
pub(crate) mod measurement;
pub(crate) mod timer;

pub use check::check;
pub use prload_core::{
    parse_duration, parse_rate, CheckSummary, ConfigError, RunStatistics, ScenarioConfig,
    TransactionLabels, VuContext, DEFAULT_DURATION, DEFAULT_GRACEFUL_STOP, DEFAULT_VUS,
};
pub use prload_macros::{scenario, transaction};
pub use scenario::Scenario;

pub mod prelude {
    pub use crate::check::check;
    pub use crate::scenario::ConfigurableScenario;
    pub use prload_core::{RunStatistics, VuContext};
    pub use prload_macros::{scenario, transaction};
}
