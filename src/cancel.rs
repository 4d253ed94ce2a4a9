//! Cooperative cancellation for conversion requests.
//!
//! A [`CancelToken`] is threaded through every conversion call and polled
//! between the decode, resize, and encode phases. Large images make an
//! unchecked pipeline a latency-spike risk, so the pipeline never runs more
//! than one phase past a triggered token.

use crate::error::{ConvertError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cheap cloneable cancellation flag. All clones observe the same trigger.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Bail out with [`ConvertError::Cancelled`] if triggered.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ConvertError::Cancelled)
        } else {
            Ok(())
        }
    }
}
