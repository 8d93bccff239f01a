//! Epoch sequencing.
//!
//! Downstream time-series consumers assume monotonic epoch indices, so the
//! sequencer is the single source of truth for which epoch was closed
//! last. Closing an epoch requires an index strictly greater than the
//! previous one; gaps are allowed.

/// Errors raised by the sequencer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EpochError {
    /// An epoch index did not increase.
    #[error("non-sequential epoch: got {got} after epoch {last} was closed")]
    NonSequentialEpoch {
        /// The most recently closed epoch.
        last: u64,
        /// The offending epoch index.
        got: u64,
    },
}

/// Tracks the last closed epoch and rejects regressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpochSequencer {
    last_closed: Option<u64>,
}

impl EpochSequencer {
    /// Create a sequencer with no epoch closed yet.
    pub const fn new() -> Self {
        Self { last_closed: None }
    }

    /// Check that an event stamped with `epoch` belongs to an open epoch.
    ///
    /// # Errors
    ///
    /// Returns [`EpochError::NonSequentialEpoch`] if `epoch` was already
    /// closed (or precedes a closed epoch).
    pub const fn check_event(&self, epoch: u64) -> Result<(), EpochError> {
        match self.last_closed {
            Some(last) if epoch <= last => Err(EpochError::NonSequentialEpoch { last, got: epoch }),
            _ => Ok(()),
        }
    }

    /// Mark `epoch` as closed.
    ///
    /// # Errors
    ///
    /// Returns [`EpochError::NonSequentialEpoch`] if `epoch` is not
    /// strictly greater than the last closed epoch. The sequencer is left
    /// unchanged in that case.
    pub const fn close(&mut self, epoch: u64) -> Result<(), EpochError> {
        if let Err(e) = self.check_event(epoch) {
            return Err(e);
        }
        self.last_closed = Some(epoch);
        Ok(())
    }

    /// The most recently closed epoch.
    pub const fn last_closed(&self) -> Option<u64> {
        self.last_closed
    }
}
