//! Batch generations.
//!
//! Every selection gets the next generation number. A batch whose number is
//! no longer the current one has been superseded.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out batch tokens and remembers which one is current.
#[derive(Debug, Clone, Default)]
pub struct BatchSequence {
    current: Arc<AtomicU64>,
}

impl BatchSequence {
    /// A sequence with no batch started yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new batch, superseding the previous one.
    pub fn next(&self) -> BatchToken {
        let id = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        BatchToken {
            id,
            current: Arc::clone(&self.current),
        }
    }

    /// Supersede the current batch without starting a new one.
    pub fn cancel_current(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }
}

/// Identity of one batch.
#[derive(Debug, Clone)]
pub struct BatchToken {
    id: u64,
    current: Arc<AtomicU64>,
}

impl BatchToken {
    /// Generation number of this batch.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// False once a newer batch was started or this one was cancelled.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_batch_supersedes_previous() {
        let sequence = BatchSequence::new();
        let first = sequence.next();
        assert!(first.is_current());

        let second = sequence.next();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(second.id(), first.id() + 1);
    }

    #[test]
    fn test_cancel_current() {
        let sequence = BatchSequence::new();
        let token = sequence.next();
        sequence.cancel_current();
        assert!(!token.is_current());
        assert!(sequence.next().is_current());
    }
}
