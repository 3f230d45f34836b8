use crate::audio::AudioChunk;
use crate::error::{Result, VidsumError};
use crate::transcribe::{ChunkTranscript, Transcriber, TranscriptSegment};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

/// OpenAI transcription API endpoint.
const TRANSCRIPTIONS_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// OpenAI speech-to-text client.
///
/// Sends one bounded-length audio chunk per call and asks for
/// `verbose_json` so the response carries per-utterance segment
/// boundaries, not just flat text. Failures are propagated verbatim;
/// there is no retry at this layer.
pub struct WhisperClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    language: Option<String>,
    base_url: String,
}

impl WhisperClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: "whisper-1".to_string(),
            language: None,
            base_url: TRANSCRIPTIONS_URL.to_string(),
        }
    }

    /// Set the transcription model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the source language (ISO 639-1 code).
    pub fn with_language(mut self, language: String) -> Self {
        self.language = Some(language);
        self
    }

    /// Override the endpoint URL (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_form(&self, wav_bytes: Vec<u8>) -> Result<Form> {
        let file_part = Part::bytes(wav_bytes)
            .file_name("chunk.wav")
            .mime_str("audio/wav")?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment");

        if let Some(ref lang) = self.language {
            form = form.text("language", lang.clone());
        }

        Ok(form)
    }

    async fn call_api(&self, form: Form) -> Result<WhisperResponse> {
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        debug!("Transcription API response status: {}", status);

        if status.is_success() {
            let body = response.text().await?;
            let parsed: WhisperResponse = serde_json::from_str(&body)?;
            return Ok(parsed);
        }

        let error_body = response.text().await.unwrap_or_default();

        if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
            return Err(VidsumError::Api(format!(
                "Transcription API error: {} ({})",
                api_error.error.message, api_error.error.r#type
            )));
        }

        Err(VidsumError::Api(format!(
            "Transcription API error ({}): {}",
            status, error_body
        )))
    }

    fn parse_response(&self, response: WhisperResponse) -> ChunkTranscript {
        let segments = match response.segments {
            Some(api_segments) => api_segments
                .into_iter()
                .map(|seg| TranscriptSegment {
                    start: seg.start,
                    end: seg.end,
                    text: seg.text,
                })
                .collect(),
            // Flat-text fallback: a single segment spanning the reported duration.
            None => vec![TranscriptSegment {
                start: 0.0,
                end: response.duration.unwrap_or(0.0),
                text: response.text,
            }],
        };

        ChunkTranscript { segments }
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, chunk: &AudioChunk) -> Result<ChunkTranscript> {
        debug!(
            "Transcribing chunk {} ({:.1}s) with {}",
            chunk.index,
            chunk.duration_secs(),
            self.model
        );

        let wav_bytes = chunk.to_wav_bytes()?;
        let form = self.build_form(wav_bytes)?;
        let response = self.call_api(form).await?;
        let transcript = self.parse_response(response);

        debug!(
            "Received {} segments for chunk {}",
            transcript.segments.len(),
            chunk.index
        );

        Ok(transcript)
    }

    fn name(&self) -> &'static str {
        "OpenAI Whisper"
    }
}

// API response types

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    segments: Option<Vec<WhisperSegment>>,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    r#type: String,
}
