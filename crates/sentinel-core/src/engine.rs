//! Per-frame distraction engine

use sentinel_api::{
    DetectionEvent, DistractionState, EscalationOutcome, FrameAction, Overlay, OverlayTone,
    RawDetection, TargetFilter,
};
use sentinel_config::Policy;
use sentinel_util::MonotonicInstant;
use tracing::{debug, info, trace};

use crate::{
    CooldownController, CooldownDecision, CoreEvent, DistractionTracker, SubmitOutcome,
    TriggerGate,
};

/// Everything decided for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub detection: DetectionEvent,
    pub state: DistractionState,
    pub action: FrameAction,
    /// Set only when the tracker asked to escalate
    pub escalation: Option<EscalationOutcome>,
    pub events: Vec<CoreEvent>,
}

impl FrameOutcome {
    pub fn submitted(&self) -> bool {
        self.escalation == Some(EscalationOutcome::Submitted)
    }
}

/// Frame-processing context.
///
/// Owns the distraction session, the cooldown state and the submitting end
/// of the notifier queue. Driven once per frame from the main loop; nothing
/// here is shared with the notifier beyond the gate.
pub struct SentinelEngine {
    filter: TargetFilter,
    target_label: String,
    tracker: DistractionTracker,
    cooldown: CooldownController,
    gate: TriggerGate,
}

impl SentinelEngine {
    pub fn new(policy: &Policy, gate: TriggerGate) -> Self {
        info!(
            target_class_id = policy.detection.target_class_id,
            confidence_threshold = policy.detection.confidence_threshold,
            limit_secs = policy.timing.distraction_limit.as_secs_f64(),
            cooldown_secs = policy.timing.cooldown.as_secs_f64(),
            "Engine initialized"
        );

        Self {
            filter: policy.detection.filter(),
            target_label: policy.detection.target_label.clone(),
            tracker: DistractionTracker::new(policy.timing.distraction_limit),
            cooldown: CooldownController::new(policy.timing.cooldown),
            gate,
        }
    }

    pub fn state(&self) -> DistractionState {
        self.tracker.state()
    }

    pub fn tracker(&self) -> &DistractionTracker {
        &self.tracker
    }

    pub fn cooldown(&self) -> &CooldownController {
        &self.cooldown
    }

    pub fn gate(&self) -> &TriggerGate {
        &self.gate
    }

    /// Process one frame of detector output at `now`
    pub fn process_frame(&mut self, raw: &[RawDetection], now: MonotonicInstant) -> FrameOutcome {
        let detection = self.filter.evaluate(raw);
        let transition = self.tracker.update(detection.target_present, now);
        let mut events = Vec::new();

        if let Some(lasted) = transition.cleared_after {
            debug!(lasted_ms = lasted.as_millis() as u64, "Distraction cleared");
            events.push(CoreEvent::DistractionCleared { lasted });
        }

        if transition.from == DistractionState::Idle && transition.to != DistractionState::Idle {
            debug!("Distraction started");
            events.push(CoreEvent::DistractionStarted);
        }

        let escalation = match transition.action {
            FrameAction::Escalate { elapsed } => {
                if transition.from != DistractionState::Violating {
                    info!(elapsed_ms = elapsed.as_millis() as u64, "Distraction limit exceeded");
                    events.push(CoreEvent::LimitExceeded { elapsed });
                }
                Some(self.escalate(now, &mut events))
            }
            FrameAction::Warn { .. } | FrameAction::None => None,
        };

        FrameOutcome {
            detection,
            state: transition.to,
            action: transition.action,
            escalation,
            events,
        }
    }

    /// Cooldown check, submission and cooldown update as one step
    fn escalate(&mut self, now: MonotonicInstant, events: &mut Vec<CoreEvent>) -> EscalationOutcome {
        if let CooldownDecision::Deny { retry_in } = self.cooldown.check(now) {
            trace!(retry_in_ms = retry_in.as_millis() as u64, "Escalation cooling down");
            return EscalationOutcome::CoolingDown { retry_in };
        }

        match self.gate.submit(now) {
            SubmitOutcome::Submitted(job_id) => {
                self.cooldown.record(now);
                info!(job_id = %job_id, "Escalation submitted");
                events.push(CoreEvent::NotificationSubmitted { job_id });
                EscalationOutcome::Submitted
            }
            SubmitOutcome::Busy => {
                trace!("Notifier busy, escalation dropped");
                EscalationOutcome::NotifierBusy
            }
            SubmitOutcome::Closed => {
                debug!("Notifier closed, escalation dropped");
                EscalationOutcome::NotifierClosed
            }
        }
    }

    /// Drawing instructions for a processed frame
    pub fn overlay(&self, outcome: &FrameOutcome) -> Overlay {
        let mut overlay = Overlay::new();

        let tone = match outcome.state {
            DistractionState::Violating => OverlayTone::Alert,
            DistractionState::Idle | DistractionState::Warming => OverlayTone::Caution,
        };
        for detection in &outcome.detection.matches {
            overlay.push_detection(&self.target_label, detection, tone);
        }

        match outcome.action {
            FrameAction::Warn { remaining } => overlay.set_warning(remaining),
            FrameAction::Escalate { .. } => overlay.set_violation(),
            FrameAction::None => {}
        }

        overlay
    }

    /// Ask the notifier to exit after its queued work
    pub fn shutdown_notifier(&self) -> bool {
        self.gate.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JobReceiver, WorkerMessage, notification_queue};
    use sentinel_api::{BoundingBox, VIOLATION_TEXT};
    use std::time::Duration;

    fn phone() -> Vec<RawDetection> {
        vec![RawDetection::new(
            67,
            0.9,
            BoundingBox::new(10.0, 10.0, 50.0, 90.0),
        )]
    }

    fn engine() -> (SentinelEngine, JobReceiver) {
        let (gate, receiver) = notification_queue();
        (SentinelEngine::new(&Policy::default(), gate), receiver)
    }

    fn at(base: MonotonicInstant, millis: u64) -> MonotonicInstant {
        base + Duration::from_millis(millis)
    }

    fn jobs(receiver: &mut JobReceiver) -> usize {
        std::iter::from_fn(|| receiver.try_recv())
            .filter(|m| matches!(m, WorkerMessage::Job(_)))
            .count()
    }

    #[test]
    fn test_idle_frames_never_submit() {
        let (mut engine, mut receiver) = engine();
        let base = MonotonicInstant::now();

        for i in 0..100 {
            let outcome = engine.process_frame(&[], at(base, i * 100));
            assert_eq!(outcome.state, DistractionState::Idle);
            assert!(outcome.events.is_empty());
            assert!(outcome.escalation.is_none());
        }

        assert_eq!(jobs(&mut receiver), 0);
        assert!(engine.tracker().session().is_none());
    }

    #[test]
    fn test_warming_frames_warn_without_submitting() {
        let (mut engine, mut receiver) = engine();
        let base = MonotonicInstant::now();

        let outcome = engine.process_frame(&phone(), base);
        assert_eq!(outcome.events, vec![CoreEvent::DistractionStarted]);

        let outcome = engine.process_frame(&phone(), at(base, 2_900));
        assert_eq!(outcome.state, DistractionState::Warming);
        assert_eq!(
            outcome.action,
            FrameAction::Warn {
                remaining: Duration::from_millis(100)
            }
        );
        assert_eq!(jobs(&mut receiver), 0);
    }

    #[test]
    fn test_violation_submits_once_and_records_cooldown() {
        let (mut engine, mut receiver) = engine();
        let base = MonotonicInstant::now();

        engine.process_frame(&phone(), base);
        let outcome = engine.process_frame(&phone(), at(base, 3_000));
        assert!(outcome.submitted());
        assert!(outcome.events.iter().any(|e| matches!(e, CoreEvent::LimitExceeded { .. })));
        assert_eq!(engine.cooldown().last_escalation(), Some(at(base, 3_000)));

        let outcome = engine.process_frame(&phone(), at(base, 3_100));
        assert!(matches!(
            outcome.escalation,
            Some(EscalationOutcome::CoolingDown { .. })
        ));
        assert!(outcome.events.is_empty());

        assert_eq!(jobs(&mut receiver), 1);
    }

    #[test]
    fn test_busy_notifier_does_not_consume_cooldown() {
        let (mut engine, mut receiver) = engine();
        let base = MonotonicInstant::now();

        engine.process_frame(&phone(), base);
        assert!(engine.process_frame(&phone(), at(base, 3_000)).submitted());

        // Cooldown passes but the first job was never acknowledged
        let outcome = engine.process_frame(&phone(), at(base, 11_500));
        assert_eq!(outcome.escalation, Some(EscalationOutcome::NotifierBusy));
        assert_eq!(engine.cooldown().last_escalation(), Some(at(base, 3_000)));

        receiver.tracker().complete();
        assert!(engine.process_frame(&phone(), at(base, 11_600)).submitted());
        assert_eq!(jobs(&mut receiver), 2);
    }

    #[test]
    fn test_closed_notifier_is_reported() {
        let (mut engine, receiver) = engine();
        drop(receiver);
        let base = MonotonicInstant::now();

        engine.process_frame(&phone(), base);
        let outcome = engine.process_frame(&phone(), at(base, 3_500));
        assert_eq!(outcome.escalation, Some(EscalationOutcome::NotifierClosed));
        assert!(engine.cooldown().last_escalation().is_none());
    }

    #[test]
    fn test_absence_clears_session_with_event() {
        let (mut engine, _receiver) = engine();
        let base = MonotonicInstant::now();

        engine.process_frame(&phone(), base);
        let outcome = engine.process_frame(&[], at(base, 1_000));
        assert_eq!(
            outcome.events,
            vec![CoreEvent::DistractionCleared {
                lasted: Duration::from_secs(1)
            }]
        );
        assert_eq!(engine.state(), DistractionState::Idle);
    }

    #[test]
    fn test_low_confidence_is_ignored() {
        let (mut engine, _receiver) = engine();
        let weak = vec![RawDetection::new(67, 0.3, BoundingBox::new(0.0, 0.0, 1.0, 1.0))];

        let outcome = engine.process_frame(&weak, MonotonicInstant::now());
        assert!(!outcome.detection.target_present);
        assert_eq!(outcome.state, DistractionState::Idle);
    }

    #[test]
    fn test_overlay_reflects_action() {
        let (mut engine, _receiver) = engine();
        let base = MonotonicInstant::now();

        let outcome = engine.process_frame(&phone(), at(base, 0));
        let overlay = engine.overlay(&outcome);
        assert_eq!(overlay.boxes.len(), 1);
        assert_eq!(overlay.boxes[0].label, "PHONE 0.90");
        assert_eq!(overlay.warning.as_deref(), Some("WARNING: 3.0s"));
        assert!(overlay.violation.is_none());
        assert_eq!(overlay.boxes[0].tone, OverlayTone::Caution);

        let outcome = engine.process_frame(&phone(), at(base, 4_000));
        let overlay = engine.overlay(&outcome);
        assert_eq!(overlay.violation.as_deref(), Some(VIOLATION_TEXT));
        assert!(overlay.warning.is_none());
        assert_eq!(overlay.boxes[0].tone, OverlayTone::Alert);

        let outcome = engine.process_frame(&[], at(base, 4_100));
        assert_eq!(engine.overlay(&outcome), Overlay::new());
    }
}
