//! Cooldown between escalations

use sentinel_util::MonotonicInstant;
use std::time::Duration;

/// Whether an escalation may go through now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    Allow,
    Deny { retry_in: Duration },
}

/// Rate-limits escalations.
///
/// Allows when nothing has been escalated yet or when strictly more than the
/// cooldown has passed since the last recorded escalation.
#[derive(Debug)]
pub struct CooldownController {
    cooldown: Duration,
    last_escalation: Option<MonotonicInstant>,
}

impl CooldownController {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_escalation: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_escalation(&self) -> Option<MonotonicInstant> {
        self.last_escalation
    }

    pub fn check(&self, now: MonotonicInstant) -> CooldownDecision {
        let Some(last) = self.last_escalation else {
            return CooldownDecision::Allow;
        };

        let since = now.duration_since(last);
        if since > self.cooldown {
            CooldownDecision::Allow
        } else {
            CooldownDecision::Deny {
                retry_in: self.cooldown - since,
            }
        }
    }

    /// Record a submitted escalation. Call only after the job was enqueued.
    pub fn record(&mut self, now: MonotonicInstant) {
        self.last_escalation = Some(now);
    }
}
