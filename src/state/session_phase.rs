//! Lifecycle of an extraction session
//!
//! ```text
//! Init ──> Batching ──> Done
//!            │  ↺
//!            └────────> TimeoutAbort
//! ```
//!
//! `Init` may also go straight to `TimeoutAbort` if the limit elapses before
//! the first batch starts.

use crate::HarvestError;
use std::fmt;

/// Phase of an extraction session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Client and limiter are being set up
    Init,

    /// Batches of pages are being fetched
    Batching,

    /// All batches finished; resources released
    Done,

    /// The session time limit elapsed; partial results discarded
    TimeoutAbort,
}

impl SessionPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::TimeoutAbort)
    }

    /// Checks whether moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        matches!(
            (self, next),
            (Init, Batching)
                | (Init, Done)
                | (Init, TimeoutAbort)
                | (Batching, Batching)
                | (Batching, Done)
                | (Batching, TimeoutAbort)
        )
    }

    /// Moves to `next`, or fails with [`HarvestError::InvalidTransition`]
    pub fn advance(&mut self, next: SessionPhase) -> Result<(), HarvestError> {
        if !self.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        tracing::trace!("Session phase {} -> {}", self, next);
        *self = next;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Batching => "batching",
            Self::Done => "done",
            Self::TimeoutAbort => "timeout_abort",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
