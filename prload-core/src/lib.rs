mod config;
mod constants;
mod context;
mod metrics;
mod stats;

pub use config::*;
pub use constants::*;
pub use context::*;
pub use metrics::*;
pub use stats::*;
