//! Cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Polled between task batches; returning `false` stops the analysis
pub trait AnalysisInterruptor {
    fn should_continue(&self) -> bool;
}

impl<F> AnalysisInterruptor for F
where
    F: Fn() -> bool,
{
    fn should_continue(&self) -> bool {
        self()
    }
}

/// Thread-safe flag another thread can raise to stop the analysis
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl AnalysisInterruptor for CancellationFlag {
    fn should_continue(&self) -> bool {
        !self.is_cancelled()
    }
}
