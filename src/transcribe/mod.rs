pub mod merge;
pub mod whisper;

pub use merge::{create_transcription, TranscribeOptions};
pub use whisper::WhisperClient;

use crate::audio::AudioChunk;
use crate::error::Result;
use async_trait::async_trait;

/// One detected unit of speech, absolute within the full source media.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Raw result for a single chunk; timestamps are local to that chunk.
#[derive(Debug, Clone)]
pub struct ChunkTranscript {
    pub segments: Vec<TranscriptSegment>,
}

/// All segments for one media item plus the SRT rendering.
#[derive(Debug, Clone)]
pub struct MergedTranscript {
    /// Ordered by start, globally monotonic across chunk boundaries.
    pub segments: Vec<TranscriptSegment>,
    pub subtitle_text: String,
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, chunk: &AudioChunk) -> Result<ChunkTranscript>;
    fn name(&self) -> &'static str;
}

/// Receives per-chunk completion updates. Presentation plumbing only;
/// carries no correctness contract.
pub trait ProgressSink: Send + Sync {
    fn chunk_done(&self, completed: usize, total: usize);
}

/// Sink that discards all progress updates.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn chunk_done(&self, _completed: usize, _total: usize) {}
}
