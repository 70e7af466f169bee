//! Cooperative cancellation for long-running evaluation loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{EvalResult, EvaluationError};

/// A cloneable cancel flag with an optional wall-clock deadline.
///
/// Checked between experiments and between resampling chunks, never inside a
/// single classifier fit.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also trips once `timeout` has elapsed from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Request cancellation. Visible to every clone.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Return `Cancelled` for `stage` if the token has tripped.
    pub fn check(&self, stage: &str) -> EvalResult<()> {
        if self.is_cancelled() {
            return Err(EvaluationError::Cancelled {
                stage: stage.to_string(),
            });
        }
        Ok(())
    }
}
