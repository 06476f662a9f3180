//! Frame acquisition, detection and display traits

use async_trait::async_trait;
use sentinel_api::{Overlay, RawDetection};
use thiserror::Error;

/// Errors from frame-side collaborators
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// One frame from the feed.
///
/// Pixel data is not carried: frames arrive already annotated by an upstream
/// detector, whose output rides along in `detections`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub sequence: u64,
    pub detections: Vec<RawDetection>,
}

impl Frame {
    pub fn new(sequence: u64, detections: Vec<RawDetection>) -> Self {
        Self {
            sequence,
            detections,
        }
    }
}

/// Supplies frames on demand
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame, or `None` when the feed has ended.
    /// Both `None` and an error end the main loop.
    async fn next_frame(&mut self) -> HostResult<Option<Frame>>;
}

/// Produces raw detections for a frame
pub trait Detector: Send {
    fn detect(&mut self, frame: &Frame) -> HostResult<Vec<RawDetection>>;
}

/// Detector that returns the annotations already attached to a frame
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDetector;

impl Detector for EmbeddedDetector {
    fn detect(&mut self, frame: &Frame) -> HostResult<Vec<RawDetection>> {
        Ok(frame.detections.clone())
    }
}

/// Whether the display wants the loop to keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayControl {
    Continue,
    /// User asked to quit
    Quit,
}

/// Presentation sink for frames and their overlay
pub trait OverlaySink: Send {
    fn present(&mut self, frame: &Frame, overlay: &Overlay) -> DisplayControl;

    /// Release display resources
    fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_api::BoundingBox;

    #[test]
    fn test_embedded_detector_returns_frame_annotations() {
        let detections = vec![RawDetection::new(
            67,
            0.9,
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        )];
        let frame = Frame::new(7, detections.clone());

        let mut detector = EmbeddedDetector;
        assert_eq!(detector.detect(&frame).unwrap(), detections);
    }
}
