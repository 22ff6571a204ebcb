//! Stopping an import batch between its store calls
//!
//! A batch has two checkpoints, one before each upsert. A cancelled token
//! stops the batch at the next checkpoint; whatever the store already
//! committed stays committed.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Where a batch checks for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    BeforePlaceholders,
    BeforeContent,
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checkpoint::BeforePlaceholders => write!(f, "before placeholder upsert"),
            Checkpoint::BeforeContent => write!(f, "before content upsert"),
        }
    }
}

/// Shared stop flag for import batches
///
/// Clones share one flag, so a handle held by a UI or a signal handler can
/// stop a batch running elsewhere.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Whether a batch reaching `checkpoint` must stop there
    pub fn stops_at(&self, checkpoint: Checkpoint) -> bool {
        let stop = self.is_cancelled();
        if stop {
            debug!(%checkpoint, "import batch stopping");
        }
        stop
    }
}
