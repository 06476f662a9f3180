//! Speech synthesis via the Google Translate TTS endpoint (gTTS-compatible)
//!
//! The endpoint accepts at most 100 characters per request, so longer text is
//! split on word boundaries and the returned MP3 segments are concatenated.

use async_trait::async_trait;
use sentinel_host_api::{NotifyError, NotifyResult, SpeechOptions, SpeechSynthesizer};
use std::time::Duration;
use tracing::debug;

/// Longest text the endpoint accepts in one request
pub const MAX_CHUNK_CHARS: usize = 100;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

pub struct GoogleTranslateTts {
    client: reqwest::Client,
}

impl GoogleTranslateTts {
    pub fn new(timeout: Duration) -> NotifyResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| NotifyError::Synthesis(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self { client })
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        index: usize,
        total: usize,
        options: &SpeechOptions,
    ) -> NotifyResult<Vec<u8>> {
        let total = total.to_string();
        let index = index.to_string();
        let textlen = chunk.chars().count().to_string();

        let response = self
            .client
            .get(endpoint_url(&options.tld))
            .header("Referer", format!("https://translate.google.{}/", options.tld))
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", options.language.as_str()),
                ("client", "tw-ob"),
                ("ttsspeed", "1"),
                ("total", total.as_str()),
                ("idx", index.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await
            .map_err(|e| NotifyError::Synthesis(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Synthesis(format!(
                "TTS error {}: {}",
                status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| NotifyError::Synthesis(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn endpoint_url(tld: &str) -> String {
    format!("https://translate.google.{}/translate_tts", tld)
}

/// Split text into chunks of at most `max_chars` characters.
///
/// Words are kept whole unless a single word is longer than the limit.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateTts {
    async fn synthesize(&self, text: &str, options: &SpeechOptions) -> NotifyResult<Vec<u8>> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(NotifyError::Synthesis("Nothing to speak".into()));
        }

        debug!(
            chunks = chunks.len(),
            language = %options.language,
            tld = %options.tld,
            "Synthesizing speech"
        );

        let mut audio = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let segment = self
                .fetch_chunk(chunk, index, chunks.len(), options)
                .await?;
            audio.extend_from_slice(&segment);
        }

        if audio.is_empty() {
            return Err(NotifyError::Synthesis("Empty audio response".into()));
        }
        Ok(audio)
    }
}
