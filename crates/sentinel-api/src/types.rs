//! Distraction states and per-frame actions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Where the distraction tracker currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistractionState {
    /// No target present, no active session
    Idle,
    /// Target present, still inside the grace period
    Warming,
    /// Target present past the grace period
    Violating,
}

impl fmt::Display for DistractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DistractionState::Idle => "idle",
            DistractionState::Warming => "warming",
            DistractionState::Violating => "violating",
        };
        f.write_str(s)
    }
}

/// Signal emitted by the distraction tracker for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FrameAction {
    None,
    /// Still warming; time left before escalation
    Warn { remaining: Duration },
    /// Grace period exceeded
    Escalate { elapsed: Duration },
}

impl FrameAction {
    pub fn is_escalate(&self) -> bool {
        matches!(self, FrameAction::Escalate { .. })
    }
}

/// What happened to an escalation signal downstream of the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EscalationOutcome {
    /// A notification job was enqueued
    Submitted,
    /// Suppressed by the cooldown
    CoolingDown { retry_in: Duration },
    /// A previous notification is still outstanding
    NotifierBusy,
    /// The notifier has shut down
    NotifierClosed,
}
