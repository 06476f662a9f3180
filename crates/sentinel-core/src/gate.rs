//! Trigger gate and the single-slot notification queue

use sentinel_util::{JobId, MonotonicInstant};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Notify, mpsc};
use tracing::debug;

/// Opaque trigger token for one utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationJob {
    pub id: JobId,
    pub submitted_at: MonotonicInstant,
}

/// Message consumed by the notifier worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMessage {
    Job(NotificationJob),
    /// Stop after everything queued before it
    Shutdown,
}

/// Result of a gate submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(JobId),
    /// A job is already queued or being processed
    Busy,
    /// The worker is gone
    Closed,
}

/// Shared view of whether a job is outstanding.
///
/// Set by the gate when a job is enqueued, cleared by the worker when the
/// job has been fully handled (successfully or not).
#[derive(Debug, Default)]
pub struct QueueTracker {
    outstanding: AtomicBool,
    submitted: AtomicU64,
    completed: AtomicU64,
    idle: Notify,
}

impl QueueTracker {
    pub fn is_busy(&self) -> bool {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    fn try_claim(&self) -> bool {
        self.outstanding
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn release(&self) {
        self.outstanding.store(false, Ordering::SeqCst);
        self.idle.notify_waiters();
    }

    /// Acknowledge that the outstanding job has been handled
    pub fn complete(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.release();
    }

    /// Wait until no job is outstanding
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if !self.is_busy() {
                return;
            }
            notified.await;
        }
    }
}

/// Non-blocking submission guard for the notifier queue.
///
/// At most one job is ever outstanding: `submit` is a no-op while the
/// previous job is queued or still being processed.
#[derive(Debug, Clone)]
pub struct TriggerGate {
    tx: mpsc::UnboundedSender<WorkerMessage>,
    tracker: Arc<QueueTracker>,
}

/// Receiving end of the notifier queue, owned by the worker
#[derive(Debug)]
pub struct JobReceiver {
    pub(crate) rx: mpsc::UnboundedReceiver<WorkerMessage>,
    pub(crate) tracker: Arc<QueueTracker>,
}

impl JobReceiver {
    pub async fn recv(&mut self) -> Option<WorkerMessage> {
        self.rx.recv().await
    }

    /// Non-blocking receive, for inspecting the queue in tests
    pub fn try_recv(&mut self) -> Option<WorkerMessage> {
        self.rx.try_recv().ok()
    }

    pub fn tracker(&self) -> &Arc<QueueTracker> {
        &self.tracker
    }
}

/// Create a connected gate and worker-side receiver
pub fn notification_queue() -> (TriggerGate, JobReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let tracker = Arc::new(QueueTracker::default());

    (
        TriggerGate {
            tx,
            tracker: tracker.clone(),
        },
        JobReceiver { rx, tracker },
    )
}

impl TriggerGate {
    pub fn tracker(&self) -> &Arc<QueueTracker> {
        &self.tracker
    }

    pub fn is_busy(&self) -> bool {
        self.tracker.is_busy()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Enqueue one job unless one is already outstanding
    pub fn submit(&self, now: MonotonicInstant) -> SubmitOutcome {
        if self.tx.is_closed() {
            return SubmitOutcome::Closed;
        }

        if !self.tracker.try_claim() {
            return SubmitOutcome::Busy;
        }

        let job = NotificationJob {
            id: JobId::new(),
            submitted_at: now,
        };

        match self.tx.send(WorkerMessage::Job(job)) {
            Ok(()) => {
                self.tracker.submitted.fetch_add(1, Ordering::SeqCst);
                debug!(job_id = %job.id, "Notification job queued");
                SubmitOutcome::Submitted(job.id)
            }
            Err(_) => {
                self.tracker.release();
                SubmitOutcome::Closed
            }
        }
    }

    /// Ask the worker to exit once it has finished what is already queued.
    ///
    /// Bypasses the gate. Returns `false` if the worker is already gone.
    pub fn shutdown(&self) -> bool {
        self.tx.send(WorkerMessage::Shutdown).is_ok()
    }
}
