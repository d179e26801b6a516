use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::AdminError;

/// Per-form "save in progress" flag.
#[derive(Debug, Default)]
pub struct InFlight {
    busy: AtomicBool,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag, or fail with [`AdminError::Busy`] if a save is already running.
    pub fn begin(&self) -> Result<InFlightGuard<'_>, AdminError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AdminError::Busy)?;
        Ok(InFlightGuard { flag: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the [`InFlight`] flag on drop, including when the save future is cancelled.
pub struct InFlightGuard<'a> {
    flag: &'a InFlight,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::Release);
    }
}
