use std::fmt;

/// Identity of a single scenario invocation.
///
/// `vu` is 1-based and stable for the lifetime of a virtual user. `iteration` is 0-based and counts
/// the iterations that virtual user has started.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VuContext {
    pub vu: u64,
    pub iteration: u64,
}

impl VuContext {
    pub fn new(vu: u64, iteration: u64) -> Self {
        Self { vu, iteration }
    }
}

impl fmt::Display for VuContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vu={} iteration={}", self.vu, self.iteration)
    }
}
