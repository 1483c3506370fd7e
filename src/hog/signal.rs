use crate::hog::error::Error;
use signal_hook::consts::SIGTERM;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-way termination request shared between the SIGTERM handler and the hog loop.
///
/// The handler installed by [`TermFlag::install`] only stores `true` into the flag,
/// it never allocates, locks or writes anything.
#[derive(Clone, Default)]
pub struct TermFlag {
    flag: Arc<AtomicBool>,
}

impl TermFlag {
    /// Create a flag without any signal handler attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a flag and register it as a SIGTERM handler.
    pub fn install() -> Result<Self, Error> {
        let term = Self::new();
        signal_hook::flag::register(SIGTERM, Arc::clone(&term.flag))
            .map_err(Error::SignalRegister)?;
        log::debug!(target: "memhog", "SIGTERM handler registered");
        Ok(term)
    }

    #[inline(always)]
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request termination from ordinary code. Repeated requests are no-ops.
    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst)
    }
}
