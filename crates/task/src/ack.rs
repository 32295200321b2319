//! Acknowledgment flag shared between the executor and pollers

use std::sync::atomic::{AtomicBool, Ordering};

/// Set once when the triggering remote call returns successfully.
///
/// The flag only ever moves from unset to set. One writer (the executor)
/// sets it, any number of pollers read it.
#[derive(Debug, Default)]
pub struct AckFlag(AtomicBool);

impl AckFlag {
    /// Create an unset flag
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Set the flag. Returns true only for the call that performed the transition.
    pub fn acknowledge(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    /// Whether the flag has been set
    pub fn is_acknowledged(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
