use std::num::NonZeroUsize;
use std::time::Duration;

/// The default number of virtual users
pub const DEFAULT_VUS: NonZeroUsize = unsafe { NonZeroUsize::new_unchecked(10) };

/// The default wall-clock length of a run
pub const DEFAULT_DURATION: Duration = Duration::from_secs(30);

/// How long in-flight iterations may keep running once the duration has elapsed
pub const DEFAULT_GRACEFUL_STOP: Duration = Duration::from_secs(30);

/// Interval between progress measurements
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);
