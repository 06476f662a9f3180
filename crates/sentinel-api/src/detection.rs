//! Detector output and per-frame target filtering

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Axis-aligned box in frame pixel coordinates (`x1, y1, x2, y2`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn is_finite(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite())
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// A detection as reported by the detector, before validation.
///
/// Every field is optional so that one incomplete entry never fails the
/// whole frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub class_id: Option<i64>,
    pub confidence: Option<f64>,
    pub bbox: Option<BoundingBox>,
}

impl RawDetection {
    pub fn new(class_id: i64, confidence: f64, bbox: BoundingBox) -> Self {
        Self {
            class_id: Some(class_id),
            confidence: Some(confidence),
            bbox: Some(bbox),
        }
    }
}

/// Why a raw detection was discarded
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedDetection {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("class id out of range: {0}")]
    ClassIdOutOfRange(i64),

    #[error("confidence out of range: {0}")]
    ConfidenceOutOfRange(f64),

    #[error("bounding box has non-finite coordinates")]
    InvalidBox,
}

/// A validated detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: u32,
    pub confidence: f64,
    pub bbox: BoundingBox,
}

impl TryFrom<&RawDetection> for Detection {
    type Error = MalformedDetection;

    fn try_from(raw: &RawDetection) -> Result<Self, Self::Error> {
        let class_id = raw
            .class_id
            .ok_or(MalformedDetection::MissingField("class_id"))?;
        let confidence = raw
            .confidence
            .ok_or(MalformedDetection::MissingField("confidence"))?;
        let bbox = raw.bbox.ok_or(MalformedDetection::MissingField("bbox"))?;

        let class_id =
            u32::try_from(class_id).map_err(|_| MalformedDetection::ClassIdOutOfRange(class_id))?;

        if !(0.0..=1.0).contains(&confidence) {
            return Err(MalformedDetection::ConfidenceOutOfRange(confidence));
        }

        if !bbox.is_finite() {
            return Err(MalformedDetection::InvalidBox);
        }

        Ok(Self {
            class_id,
            confidence,
            bbox,
        })
    }
}

/// Per-frame result of filtering detector output for the target object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionEvent {
    pub target_present: bool,
    /// Detections that matched the target, for overlay boxes
    pub matches: Vec<Detection>,
}

impl DetectionEvent {
    pub fn absent() -> Self {
        Self::default()
    }
}

/// Filters raw detections by target class and confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFilter {
    pub target_class_id: u32,
    pub confidence_threshold: f64,
}

impl TargetFilter {
    pub fn new(target_class_id: u32, confidence_threshold: f64) -> Self {
        Self {
            target_class_id,
            confidence_threshold,
        }
    }

    /// Match rule: same class and confidence strictly above the threshold
    pub fn matches(&self, detection: &Detection) -> bool {
        detection.class_id == self.target_class_id
            && detection.confidence > self.confidence_threshold
    }

    /// Reduce one frame of detector output to a detection event.
    /// Malformed entries count as no detection.
    pub fn evaluate(&self, raw: &[RawDetection]) -> DetectionEvent {
        let mut matches = Vec::new();

        for entry in raw {
            match Detection::try_from(entry) {
                Ok(detection) if self.matches(&detection) => matches.push(detection),
                Ok(_) => {}
                Err(e) => {
                    debug!(error = %e, "Discarding malformed detection");
                }
            }
        }

        DetectionEvent {
            target_present: !matches.is_empty(),
            matches,
        }
    }
}
