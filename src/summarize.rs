//! Streaming summary generation via the OpenAI chat completions API.
//!
//! The generated text carries chapter headers in the convention
//! consumed by [`crate::chapters::extract_chapters`].

use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::error::{Result, VidsumError};

/// OpenAI chat completions endpoint.
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Options for one summary generation.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// Natural language the summary is written in.
    pub language: String,
    /// Optional free-text context appended to the prompt.
    pub context: Option<String>,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            language: "English".to_string(),
            context: None,
        }
    }
}

/// Chat-completions client that streams summary text token by token.
pub struct SummaryClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl SummaryClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: "gpt-4o".to_string(),
            base_url: CHAT_COMPLETIONS_URL.to_string(),
        }
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the endpoint URL (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn system_instruction(language: &str) -> String {
        format!(
            "Your task is to create a text summary. Input is a transcription of a video \
             with timestamps. Output should contain a general summary followed by a summary \
             of each section (if applicable). Title each section exactly as \
             '#### N. Title (MM:SS\u{2013}MM:SS)' where N is a sequential number starting \
             at 1 and the timestamps cover the section's range. Response language should \
             be {language}."
        )
    }

    fn build_prompt(transcript: &str, context: Option<&str>) -> String {
        let mut prompt = format!("Summarize the following text in a concise manner:\n\n{transcript}");
        if let Some(context) = context {
            prompt.push_str(&format!("\n\nAdditional context:\n{context}"));
        }
        prompt
    }

    /// Start a streaming summary generation.
    ///
    /// Returns a lazy, finite, non-restartable stream of text fragments;
    /// the caller pulls until exhausted or aborts early by dropping it.
    pub async fn stream_summary(
        &self,
        transcript: &str,
        options: &SummaryOptions,
    ) -> Result<SummaryStream> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Self::system_instruction(&options.language),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(transcript, options.context.as_deref()),
                },
            ],
            temperature: 0.7,
            stream: true,
        };

        debug!("Requesting summary with model {}", self.model);

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(VidsumError::Api(format!(
                    "Authentication failed ({status}): check your API key"
                )));
            }
            return Err(VidsumError::Api(format!(
                "Summary API error ({status}): {body}"
            )));
        }

        Ok(SummaryStream {
            bytes: response
                .bytes_stream()
                .map(|r| r.map(|b| b.to_vec()))
                .boxed(),
            buffer: Vec::new(),
            pending: VecDeque::new(),
            done: false,
        })
    }
}

/// Token stream for one summary generation.
///
/// Wraps the SSE response body and yields text fragments in arrival
/// order. Exhausted once `[DONE]` arrives or the connection closes.
pub struct SummaryStream {
    bytes: BoxStream<'static, std::result::Result<Vec<u8>, reqwest::Error>>,
    buffer: Vec<u8>,
    pending: VecDeque<String>,
    done: bool,
}

impl SummaryStream {
    /// Pull the next text fragment. `None` once the stream is exhausted.
    pub async fn next_fragment(&mut self) -> Option<Result<String>> {
        loop {
            if let Some(fragment) = self.pending.pop_front() {
                return Some(Ok(fragment));
            }
            if self.done {
                return None;
            }

            match self.bytes.next().await {
                Some(Ok(chunk)) => {
                    self.buffer.extend_from_slice(&chunk);
                    self.drain_lines();
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.done = true;
                    self.flush_remainder();
                }
            }
        }
    }

    /// Pull all remaining fragments and concatenate them.
    pub async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(fragment) = self.next_fragment().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }

    fn drain_lines(&mut self) {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            match parse_sse_line(line.trim_end()) {
                SseEvent::Fragment(text) => self.pending.push_back(text),
                SseEvent::Done => self.done = true,
                SseEvent::Ignore => {}
            }
        }
    }

    /// Handle a final line left without a trailing newline when the
    /// connection closes before `[DONE]`.
    fn flush_remainder(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        if let SseEvent::Fragment(text) = parse_sse_line(line.trim_end()) {
            self.pending.push_back(text);
        }
    }
}

/// One parsed server-sent-events line.
#[derive(Debug, PartialEq)]
enum SseEvent {
    Fragment(String),
    Done,
    Ignore,
}

fn parse_sse_line(line: &str) -> SseEvent {
    let Some(data) = line.strip_prefix("data: ") else {
        return SseEvent::Ignore;
    };

    if data.trim() == "[DONE]" {
        return SseEvent::Done;
    }

    let Ok(parsed) = serde_json::from_str::<StreamChunk>(data) else {
        return SseEvent::Ignore;
    };

    match parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
    {
        Some(content) if !content.is_empty() => SseEvent::Fragment(content),
        _ => SseEvent::Ignore,
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}
