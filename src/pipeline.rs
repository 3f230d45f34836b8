use std::path::Path;

use tempfile::TempDir;
use tracing::{debug, info};

use crate::audio::extract_audio;
use crate::chapters::{extract_chapters, Chapter};
use crate::config::Config;
use crate::error::{Result, VidsumError};
use crate::summarize::{SummaryClient, SummaryOptions, SummaryStream};
use crate::transcribe::{
    create_transcription, MergedTranscript, ProgressSink, TranscribeOptions, WhisperClient,
};
use crate::youtube::{captions_to_text, video_id, CaptionClient};

/// A finished summary with its recovered chapter list.
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub text: String,
    pub chapters: Vec<Chapter>,
}

impl SummaryReport {
    /// Extract chapters from completed summary text.
    pub fn from_text(text: String) -> Self {
        let chapters = extract_chapters(&text);
        Self { text, chapters }
    }
}

fn api_key(config: &Config) -> Result<&str> {
    config
        .openai_api_key
        .as_deref()
        .ok_or_else(|| {
            VidsumError::Config(
                "OpenAI API key not set. Set OPENAI_API_KEY environment variable.".to_string(),
            )
        })
}

/// Transcribe a local video/audio file into a merged transcript.
///
/// Extracts the audio track to a temporary WAV, then runs the chunked
/// transcription over it. Temporary files are removed when the
/// function returns.
pub async fn transcribe_file(
    input: &Path,
    config: &Config,
    progress: &dyn ProgressSink,
) -> Result<MergedTranscript> {
    if !input.exists() {
        return Err(VidsumError::FileNotFound(input.display().to_string()));
    }

    let temp_dir = TempDir::new()?;
    let wav_path = temp_dir.path().join("audio.wav");
    debug!("Using temp directory: {:?}", temp_dir.path());

    info!("Stage 1/2: Extracting audio from {:?}", input);
    let duration = extract_audio(input, &wav_path).await?;
    info!("Audio extracted: {:.1}s", duration);

    info!(
        "Stage 2/2: Transcribing in {}-minute chunks",
        config.chunk_minutes
    );
    let audio_bytes = std::fs::read(&wav_path)?;

    let transcriber = WhisperClient::new(api_key(config)?.to_string())
        .with_model(config.transcribe_model.clone());
    let options = TranscribeOptions {
        chunk_secs: config.chunk_seconds(),
    };

    create_transcription(&transcriber, &audio_bytes, &options, progress).await
}

/// Start a streaming summary generation for transcript text.
pub async fn summarize_transcript(
    transcript_text: &str,
    config: &Config,
    options: &SummaryOptions,
) -> Result<SummaryStream> {
    let client =
        SummaryClient::new(api_key(config)?.to_string()).with_model(config.chat_model.clone());
    client.stream_summary(transcript_text, options).await
}

/// Fetch YouTube captions for a URL and join them into summary input.
///
/// `Ok(None)` means the video exists but has no captions in `lang`.
pub async fn youtube_caption_text(url: &str, lang: &str) -> Result<Option<String>> {
    let id = video_id(url)
        .ok_or_else(|| VidsumError::Api(format!("Not a recognizable YouTube URL: {url}")))?;

    info!("Fetching captions for video {}", id);
    let captions = CaptionClient::new().fetch_captions(&id, lang).await?;

    Ok(captions.map(|c| captions_to_text(&c)))
}
