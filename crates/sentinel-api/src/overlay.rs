//! Drawing instructions handed to the display collaborator

use serde::{Deserialize, Serialize};
use sentinel_util::format_countdown;
use std::time::Duration;

use crate::{BoundingBox, Detection};

/// Text of the violation banner
pub const VIOLATION_TEXT: &str = "VIOLATION!";

/// Semantic colour of an overlay element; the display picks the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayTone {
    /// Limit exceeded
    Alert,
    /// Target present, still within the limit
    Caution,
}

/// A labelled box around a matched detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayBox {
    pub bbox: BoundingBox,
    pub label: String,
    pub tone: OverlayTone,
}

/// Everything the display should draw on top of one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub boxes: Vec<OverlayBox>,
    pub warning: Option<String>,
    pub violation: Option<String>,
    pub fps: Option<f64>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Box a matched detection, labelled e.g. `PHONE 0.87`
    pub fn push_detection(&mut self, label: &str, detection: &Detection, tone: OverlayTone) {
        self.boxes.push(OverlayBox {
            bbox: detection.bbox,
            label: format!("{} {:.2}", label, detection.confidence),
            tone,
        });
    }

    pub fn set_warning(&mut self, remaining: Duration) {
        self.warning = Some(format!("WARNING: {}", format_countdown(remaining)));
    }

    pub fn set_violation(&mut self) {
        self.violation = Some(VIOLATION_TEXT.to_string());
    }

    pub fn set_fps(&mut self, fps: f64) {
        self.fps = Some(fps);
    }

    /// Single-line textual rendering for terminal displays
    pub fn status_line(&self) -> String {
        let mut parts = Vec::new();

        if let Some(violation) = &self.violation {
            parts.push(violation.clone());
        }
        if let Some(warning) = &self.warning {
            parts.push(warning.clone());
        }
        for b in &self.boxes {
            parts.push(format!("[{}]", b.label));
        }
        if let Some(fps) = self.fps {
            parts.push(format!("FPS: {:.0}", fps));
        }

        if parts.is_empty() {
            "clear".to_string()
        } else {
            parts.join("  ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_text_has_one_decimal() {
        let mut overlay = Overlay::new();
        overlay.set_warning(Duration::from_millis(2140));
        assert_eq!(overlay.warning.as_deref(), Some("WARNING: 2.1s"));
    }

    #[test]
    fn test_detection_label_includes_confidence() {
        let mut overlay = Overlay::new();
        let detection = Detection {
            class_id: 67,
            confidence: 0.873,
            bbox: BoundingBox::new(1.0, 2.0, 3.0, 4.0),
        };
        overlay.push_detection("PHONE", &detection, OverlayTone::Caution);

        assert_eq!(overlay.boxes.len(), 1);
        assert_eq!(overlay.boxes[0].label, "PHONE 0.87");
        assert_eq!(overlay.boxes[0].tone, OverlayTone::Caution);
    }

    #[test]
    fn test_status_line_orders_banner_first() {
        let mut overlay = Overlay::new();
        overlay.set_fps(29.7);
        overlay.set_violation();
        assert_eq!(overlay.status_line(), "VIOLATION!  FPS: 30");

        assert_eq!(Overlay::new().status_line(), "clear");
    }
}
