//! Scoped per-unit tracing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag saying whether the unit currently running is traced.
///
/// Cloning shares the flag. Tracing is only ever turned on through
/// [`TraceSwitch::enable`], which hands back a guard that turns it off again.
#[derive(Debug, Clone, Default)]
pub struct TraceSwitch {
    enabled: Arc<AtomicBool>,
}

impl TraceSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Turn tracing on until the returned guard is dropped.
    #[must_use = "tracing is disabled again as soon as the guard is dropped"]
    pub fn enable(&self) -> TraceGuard {
        self.enabled.store(true, Ordering::SeqCst);
        tracing::trace!("Unit tracing enabled");
        TraceGuard {
            switch: self.clone(),
        }
    }
}

/// Disables tracing on drop, on every exit path of the traced unit.
#[derive(Debug)]
pub struct TraceGuard {
    switch: TraceSwitch,
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        self.switch.enabled.store(false, Ordering::SeqCst);
        tracing::trace!("Unit tracing disabled");
    }
}
