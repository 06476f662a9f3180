//! Distraction session state machine

use sentinel_api::{DistractionState, FrameAction};
use sentinel_util::MonotonicInstant;
use std::time::Duration;

/// One unbroken interval of target presence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistractionSession {
    pub started_at: MonotonicInstant,
}

impl DistractionSession {
    pub fn new(started_at: MonotonicInstant) -> Self {
        Self { started_at }
    }

    pub fn elapsed(&self, now: MonotonicInstant) -> Duration {
        now.duration_since(self.started_at)
    }
}

/// Result of feeding one frame to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: DistractionState,
    pub to: DistractionState,
    pub action: FrameAction,
    /// Length of the session that this frame ended, if any
    pub cleared_after: Option<Duration>,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Tracks continuous presence of the target across frames.
///
/// A single absent frame resets the session; there is no debounce.
#[derive(Debug)]
pub struct DistractionTracker {
    limit: Duration,
    session: Option<DistractionSession>,
    state: DistractionState,
}

impl DistractionTracker {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            session: None,
            state: DistractionState::Idle,
        }
    }

    pub fn state(&self) -> DistractionState {
        self.state
    }

    pub fn session(&self) -> Option<&DistractionSession> {
        self.session.as_ref()
    }

    /// Elapsed time of the active session, if any
    pub fn elapsed(&self, now: MonotonicInstant) -> Option<Duration> {
        self.session.map(|s| s.elapsed(now))
    }

    /// Advance the state machine by one frame
    pub fn update(&mut self, target_present: bool, now: MonotonicInstant) -> Transition {
        let from = self.state;

        if !target_present {
            let cleared_after = self.session.take().map(|s| s.elapsed(now));
            self.state = DistractionState::Idle;
            return Transition {
                from,
                to: self.state,
                action: FrameAction::None,
                cleared_after,
            };
        }

        let session = *self
            .session
            .get_or_insert_with(|| DistractionSession::new(now));
        let elapsed = session.elapsed(now);

        let action = if elapsed >= self.limit {
            self.state = DistractionState::Violating;
            FrameAction::Escalate { elapsed }
        } else {
            self.state = DistractionState::Warming;
            FrameAction::Warn {
                remaining: self.limit - elapsed,
            }
        };

        Transition {
            from,
            to: self.state,
            action,
            cleared_after: None,
        }
    }
}
