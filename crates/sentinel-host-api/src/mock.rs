//! Mock collaborators for unit/integration testing

use async_trait::async_trait;
use sentinel_api::{BoundingBox, Overlay, RawDetection};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{
    AudioPlayer, DisplayControl, Frame, FrameSource, GenerationRequest, HostError, HostResult,
    MessageGenerator, NotifyError, NotifyResult, OverlaySink, PlaybackOutcome, SpeechOptions,
    SpeechSynthesizer,
};

/// Frame source that replays a fixed list of frames, then ends
pub struct MockFrameSource {
    frames: VecDeque<Frame>,
    fail_at_end: bool,
}

impl MockFrameSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            fail_at_end: false,
        }
    }

    /// One frame per flag: `true` carries a confident detection of `class_id`
    pub fn from_presence(class_id: i64, presence: &[bool]) -> Self {
        let frames = presence
            .iter()
            .enumerate()
            .map(|(i, present)| {
                let detections = if *present {
                    vec![RawDetection::new(
                        class_id,
                        0.9,
                        BoundingBox::new(100.0, 100.0, 200.0, 300.0),
                    )]
                } else {
                    vec![]
                };
                Frame::new(i as u64, detections)
            })
            .collect();
        Self::new(frames)
    }

    /// Report an acquisition error instead of a clean end of feed
    pub fn failing_at_end(mut self) -> Self {
        self.fail_at_end = true;
        self
    }
}

#[async_trait]
impl FrameSource for MockFrameSource {
    async fn next_frame(&mut self) -> HostResult<Option<Frame>> {
        match self.frames.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None if self.fail_at_end => Err(HostError::Acquisition("Mock camera unplugged".into())),
            None => Ok(None),
        }
    }
}

/// Display that records every overlay and can request quit after N frames
#[derive(Default)]
pub struct RecordingOverlay {
    pub overlays: Arc<Mutex<Vec<Overlay>>>,
    pub quit_after: Option<usize>,
    pub closed: Arc<Mutex<bool>>,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quit_after(mut self, frames: usize) -> Self {
        self.quit_after = Some(frames);
        self
    }
}

impl OverlaySink for RecordingOverlay {
    fn present(&mut self, _frame: &Frame, overlay: &Overlay) -> DisplayControl {
        let mut overlays = self.overlays.lock().unwrap();
        overlays.push(overlay.clone());

        match self.quit_after {
            Some(n) if overlays.len() >= n => DisplayControl::Quit,
            _ => DisplayControl::Continue,
        }
    }

    fn close(&mut self) {
        *self.closed.lock().unwrap() = true;
    }
}

/// Scripted generation backend.
///
/// Queued results are returned in order; once empty, every call succeeds
/// with the default line.
pub struct MockGenerator {
    script: Mutex<VecDeque<Result<String, String>>>,
    default_line: String,
    calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_line: "Put the phone down and get back to work.".into(),
            calls: AtomicUsize::new(0),
            delay: Mutex::new(None),
        }
    }

    pub fn push_ok(&self, line: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(line.into()));
    }

    pub fn push_err(&self, message: impl Into<String>) {
        self.script.lock().unwrap().push_back(Err(message.into()));
    }

    /// Simulate a slow backend
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageGenerator for MockGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> NotifyResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(line)) => Ok(line),
            Some(Err(message)) => Err(NotifyError::Generation(message)),
            None => Ok(self.default_line.clone()),
        }
    }
}

/// Synthesizer that "renders" text as its UTF-8 bytes
#[derive(Default)]
pub struct MockSynthesizer {
    pub texts: Mutex<Vec<String>>,
    pub fail: Mutex<bool>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, _options: &SpeechOptions) -> NotifyResult<Vec<u8>> {
        if *self.fail.lock().unwrap() {
            return Err(NotifyError::Synthesis("Mock synthesis failure".into()));
        }
        self.texts.lock().unwrap().push(text.to_string());
        Ok(text.as_bytes().to_vec())
    }
}

/// One recorded playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRecord {
    pub path: PathBuf,
    /// File contents at the moment playback started
    pub contents: Vec<u8>,
}

/// Player that records calls instead of producing sound
#[derive(Default)]
pub struct RecordingPlayer {
    plays: Mutex<Vec<PlayRecord>>,
    active: AtomicUsize,
    max_concurrent: AtomicUsize,
    delay: Mutex<Option<Duration>>,
    pub fail: Mutex<bool>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate playback length
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn plays(&self) -> Vec<PlayRecord> {
        self.plays.lock().unwrap().clone()
    }

    /// Highest number of playbacks ever observed running at once
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioPlayer for RecordingPlayer {
    async fn play(&self, path: &Path) -> NotifyResult<PlaybackOutcome> {
        if *self.fail.lock().unwrap() {
            return Err(NotifyError::Playback("Mock player missing".into()));
        }

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(active, Ordering::SeqCst);

        let contents = tokio::fs::read(path).await;

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);

        self.plays.lock().unwrap().push(PlayRecord {
            path: path.to_path_buf(),
            contents: contents?,
        });

        Ok(PlaybackOutcome::success())
    }
}
