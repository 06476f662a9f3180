//! The detect-decide-render frame loop

use sentinel_host_api::{Detector, DisplayControl, FrameSource, OverlaySink};
use sentinel_util::MonotonicInstant;
use std::future::Future;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::{CoreEvent, SentinelEngine};

/// Why the frame loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The feed reported a clean end
    FeedEnded,
    /// The feed failed to deliver a frame
    AcquisitionFailed(String),
    /// The display asked to quit
    UserQuit,
    /// External shutdown request (signal)
    Interrupted,
}

/// Counters kept by the frame loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub frames: u64,
    pub detection_errors: u64,
    pub escalations_submitted: u64,
}

type Clock = Box<dyn FnMut() -> MonotonicInstant + Send>;

/// Drives the engine from a frame source and feeds the display
pub struct Monitor<S, D, O> {
    engine: SentinelEngine,
    source: S,
    detector: D,
    display: O,
    clock: Clock,
    stats: MonitorStats,
}

impl<S, D, O> Monitor<S, D, O>
where
    S: FrameSource,
    D: Detector,
    O: OverlaySink,
{
    pub fn new(engine: SentinelEngine, source: S, detector: D, display: O) -> Self {
        Self {
            engine,
            source,
            detector,
            display,
            clock: Box::new(MonotonicInstant::now),
            stats: MonitorStats::default(),
        }
    }

    /// Replace the decision clock (tests step time deterministically)
    pub fn with_clock(mut self, clock: impl FnMut() -> MonotonicInstant + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn engine(&self) -> &SentinelEngine {
        &self.engine
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Run until the feed ends, the display quits or `shutdown` resolves.
    /// Display resources are released before returning.
    pub async fn run<F>(&mut self, shutdown: F) -> StopReason
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Monitor running");

        let reason = loop {
            let loop_start = Instant::now();

            let frame = tokio::select! {
                biased;
                _ = &mut shutdown => break StopReason::Interrupted,
                frame = self.source.next_frame() => frame,
            };

            let frame = match frame {
                Ok(Some(frame)) => frame,
                Ok(None) => break StopReason::FeedEnded,
                Err(e) => {
                    error!(error = %e, "Frame acquisition failed");
                    break StopReason::AcquisitionFailed(e.to_string());
                }
            };

            let raw = match self.detector.detect(&frame) {
                Ok(raw) => raw,
                Err(e) => {
                    self.stats.detection_errors += 1;
                    warn!(sequence = frame.sequence, error = %e, "Detection failed, treating frame as empty");
                    Vec::new()
                }
            };

            let now = (self.clock)();
            let outcome = self.engine.process_frame(&raw, now);
            self.stats.frames += 1;

            for event in &outcome.events {
                log_event(event);
            }
            if outcome.submitted() {
                self.stats.escalations_submitted += 1;
            }

            let mut overlay = self.engine.overlay(&outcome);
            let frame_time = loop_start.elapsed().as_secs_f64();
            if frame_time > 0.0 {
                overlay.set_fps(1.0 / frame_time);
            }

            if self.display.present(&frame, &overlay) == DisplayControl::Quit {
                break StopReason::UserQuit;
            }
        };

        self.display.close();

        info!(
            reason = ?reason,
            frames = self.stats.frames,
            escalations = self.stats.escalations_submitted,
            "Monitor stopped"
        );
        reason
    }
}

fn log_event(event: &CoreEvent) {
    match event {
        CoreEvent::DistractionStarted => info!("Target in view"),
        CoreEvent::DistractionCleared { lasted } => {
            info!(lasted_ms = lasted.as_millis() as u64, "Target gone")
        }
        CoreEvent::LimitExceeded { elapsed } => {
            warn!(elapsed_ms = elapsed.as_millis() as u64, "Violation")
        }
        CoreEvent::NotificationSubmitted { job_id } => {
            info!(job_id = %job_id, "Rebuke requested")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification_queue;
    use sentinel_config::Policy;
    use sentinel_host_api::{EmbeddedDetector, MockFrameSource, RecordingOverlay};

    fn engine() -> (SentinelEngine, crate::JobReceiver) {
        let (gate, receiver) = notification_queue();
        (SentinelEngine::new(&Policy::default(), gate), receiver)
    }

    #[tokio::test]
    async fn test_feed_end_stops_the_loop_and_closes_display() {
        let (engine, _receiver) = engine();
        let display = RecordingOverlay::new();
        let overlays = display.overlays.clone();
        let closed = display.closed.clone();

        let source = MockFrameSource::from_presence(67, &[false, true, false]);
        let mut monitor = Monitor::new(engine, source, EmbeddedDetector, display);

        let reason = monitor.run(std::future::pending()).await;
        assert_eq!(reason, StopReason::FeedEnded);
        assert_eq!(monitor.stats().frames, 3);
        assert_eq!(overlays.lock().unwrap().len(), 3);
        assert!(*closed.lock().unwrap());
    }

    #[tokio::test]
    async fn test_acquisition_failure_is_fatal() {
        let (engine, _receiver) = engine();
        let source = MockFrameSource::from_presence(67, &[true]).failing_at_end();
        let mut monitor = Monitor::new(engine, source, EmbeddedDetector, RecordingOverlay::new());

        let reason = monitor.run(std::future::pending()).await;
        assert!(matches!(reason, StopReason::AcquisitionFailed(_)));
        assert_eq!(monitor.stats().frames, 1);
    }

    #[tokio::test]
    async fn test_display_quit_stops_the_loop() {
        let (engine, _receiver) = engine();
        let source = MockFrameSource::from_presence(67, &[false; 10]);
        let display = RecordingOverlay::new().quit_after(4);
        let mut monitor = Monitor::new(engine, source, EmbeddedDetector, display);

        assert_eq!(monitor.run(std::future::pending()).await, StopReason::UserQuit);
        assert_eq!(monitor.stats().frames, 4);
    }

    #[tokio::test]
    async fn test_shutdown_future_interrupts() {
        let (engine, _receiver) = engine();
        let source = MockFrameSource::from_presence(67, &[false; 10]);
        let mut monitor = Monitor::new(engine, source, EmbeddedDetector, RecordingOverlay::new());

        assert_eq!(monitor.run(async {}).await, StopReason::Interrupted);
    }
}
