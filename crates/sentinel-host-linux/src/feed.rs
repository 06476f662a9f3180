//! JSON-lines detection feed
//!
//! Each line is one frame, either an object with a `detections` array or a
//! bare array:
//!
//! ```text
//! {"detections": [{"class_id": 67, "confidence": 0.91, "bbox": [120, 80, 260, 400]}]}
//! []
//! ```

use async_trait::async_trait;
use sentinel_api::RawDetection;
use sentinel_host_api::{Frame, FrameSource, HostError, HostResult};
use serde::Deserialize;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedLine {
    Annotated {
        #[serde(default)]
        detections: Vec<serde_json::Value>,
    },
    Bare(Vec<serde_json::Value>),
}

impl FeedLine {
    fn into_entries(self) -> Vec<serde_json::Value> {
        match self {
            FeedLine::Annotated { detections } => detections,
            FeedLine::Bare(entries) => entries,
        }
    }
}

/// Frame source reading one JSON document per line
pub struct JsonLinesFeed<R> {
    lines: Lines<R>,
    sequence: u64,
}

impl<R> JsonLinesFeed<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            sequence: 0,
        }
    }
}

impl JsonLinesFeed<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        info!("Reading detection feed from stdin");
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl JsonLinesFeed<BufReader<tokio::fs::File>> {
    pub async fn open(path: impl AsRef<Path>) -> HostResult<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        info!(path = %path.display(), "Reading detection feed from file");
        Ok(Self::new(BufReader::new(file)))
    }
}

/// Parse one feed line into raw detections.
///
/// Entries that do not deserialize are dropped; the rest of the frame stands.
pub fn parse_feed_line(line: &str) -> HostResult<Vec<RawDetection>> {
    let parsed: FeedLine = serde_json::from_str(line)
        .map_err(|e| HostError::Acquisition(format!("Malformed frame: {}", e)))?;

    Ok(parsed
        .into_entries()
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawDetection>(value) {
            Ok(raw) => Some(raw),
            Err(e) => {
                debug!(error = %e, "Dropping unreadable detection entry");
                None
            }
        })
        .collect())
}

#[async_trait]
impl<R> FrameSource for JsonLinesFeed<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_frame(&mut self) -> HostResult<Option<Frame>> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let detections = parse_feed_line(line)?;
            let frame = Frame::new(self.sequence, detections);
            self.sequence += 1;
            return Ok(Some(frame));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_api::BoundingBox;

    #[test]
    fn test_parses_annotated_and_bare_lines() {
        let raw = parse_feed_line(
            r#"{"detections": [{"class_id": 67, "confidence": 0.91, "bbox": [1, 2, 3, 4]}]}"#,
        )
        .unwrap();
        assert_eq!(
            raw,
            vec![RawDetection::new(67, 0.91, BoundingBox::new(1.0, 2.0, 3.0, 4.0))]
        );

        assert!(parse_feed_line("[]").unwrap().is_empty());
        assert!(parse_feed_line("{}").unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_entries_are_dropped() {
        let raw = parse_feed_line(
            r#"[{"class_id": "phone"}, 42, {"class_id": 67, "confidence": 0.8, "bbox": [0, 0, 1, 1]}]"#,
        )
        .unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].class_id, Some(67));
    }

    #[test]
    fn test_malformed_line_is_an_acquisition_error() {
        assert!(matches!(
            parse_feed_line("{not json"),
            Err(HostError::Acquisition(_))
        ));
    }

    #[tokio::test]
    async fn test_feed_numbers_frames_and_skips_blank_lines() {
        let input = "[]\n\n{\"detections\": []}\n";
        let mut feed = JsonLinesFeed::new(BufReader::new(input.as_bytes()));

        assert_eq!(feed.next_frame().await.unwrap().unwrap().sequence, 0);
        assert_eq!(feed.next_frame().await.unwrap().unwrap().sequence, 1);
        assert!(feed.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_feed_reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.jsonl");
        tokio::fs::write(&path, "[{\"class_id\": 67, \"confidence\": 0.7, \"bbox\": [0,0,1,1]}]\n")
            .await
            .unwrap();

        let mut feed = JsonLinesFeed::open(&path).await.unwrap();
        let frame = feed.next_frame().await.unwrap().unwrap();
        assert_eq!(frame.detections.len(), 1);
    }
}
