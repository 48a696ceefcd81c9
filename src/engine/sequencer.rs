use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out the global 1-based attempt index.
///
/// Workers draw from one shared instance at dispatch time, so `seq` values
/// are unique and dense across the whole job even though completion order may
/// differ.
#[derive(Debug, Default)]
pub struct Sequencer(AtomicU64);

impl Sequencer {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    #[must_use]
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst).saturating_add(1)
    }
}
