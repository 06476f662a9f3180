//! Core events emitted by the engine

use sentinel_util::JobId;
use std::time::Duration;

/// Events emitted by the engine on state changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// Target appeared; a distraction session began
    DistractionStarted,

    /// Target disappeared; the session was reset
    DistractionCleared { lasted: Duration },

    /// The grace period ran out for the current session
    LimitExceeded { elapsed: Duration },

    /// A notification job was handed to the notifier
    NotificationSubmitted { job_id: JobId },
}
