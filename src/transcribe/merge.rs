use tracing::{debug, info, warn};

use crate::audio::split_into_chunks;
use crate::error::Result;
use crate::subtitle;
use crate::transcribe::{MergedTranscript, ProgressSink, Transcriber, TranscriptSegment};

/// Options for chunked transcription.
#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    /// Fixed chunk window length in seconds.
    pub chunk_secs: f64,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self { chunk_secs: 900.0 }
    }
}

/// Transcribe an arbitrarily long WAV byte stream into one globally
/// time-aligned transcript.
///
/// Chunks are processed strictly one at a time, in index order. Each
/// chunk's local timestamps are shifted by `index * chunk_secs`, so the
/// merged sequence is monotonic by construction and no re-sorting is
/// needed. If any chunk fails, the whole operation fails and completed
/// chunks are discarded.
pub async fn create_transcription(
    transcriber: &dyn Transcriber,
    audio_bytes: &[u8],
    options: &TranscribeOptions,
    progress: &dyn ProgressSink,
) -> Result<MergedTranscript> {
    let chunks = split_into_chunks(audio_bytes, options.chunk_secs)?;
    let total = chunks.len();

    info!(
        "Transcribing {} chunks of {}s with {}",
        total,
        options.chunk_secs,
        transcriber.name()
    );

    let mut segments: Vec<TranscriptSegment> = Vec::new();

    for chunk in &chunks {
        let offset = chunk.index as f64 * options.chunk_secs;

        let transcript = transcriber.transcribe(chunk).await.map_err(|e| {
            warn!("Chunk {} failed: {}", chunk.index, e);
            e
        })?;

        debug!(
            "Chunk {} done: {} segments at offset {}s",
            chunk.index,
            transcript.segments.len(),
            offset
        );

        for segment in transcript.segments {
            segments.push(TranscriptSegment {
                start: segment.start + offset,
                end: segment.end + offset,
                text: segment.text.trim().to_string(),
            });
        }

        progress.chunk_done(chunk.index + 1, total);
    }

    info!("Transcription complete: {} segments", segments.len());

    let subtitle_text = subtitle::render_srt(&segments);

    Ok(MergedTranscript {
        segments,
        subtitle_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioChunk;
    use crate::error::VidsumError;
    use crate::transcribe::{ChunkTranscript, NoProgress};
    use async_trait::async_trait;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn silent_wav(secs: f64) -> Vec<u8> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for _ in 0..(secs * 16000.0) as usize {
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    /// Returns one chunk-local segment per call.
    struct MockTranscriber {
        fail_on_index: Option<usize>,
    }

    #[async_trait]
    impl Transcriber for MockTranscriber {
        async fn transcribe(&self, chunk: &AudioChunk) -> Result<ChunkTranscript> {
            if self.fail_on_index == Some(chunk.index) {
                return Err(VidsumError::Transcription("mock failure".to_string()));
            }
            Ok(ChunkTranscript {
                segments: vec![TranscriptSegment {
                    start: 30.0,
                    end: 35.0,
                    text: format!("  chunk {} speech  ", chunk.index),
                }],
            })
        }

        fn name(&self) -> &'static str {
            "Mock"
        }
    }

    struct CountingSink {
        calls: AtomicUsize,
        last: Mutex<(usize, usize)>,
    }

    impl ProgressSink for CountingSink {
        fn chunk_done(&self, completed: usize, total: usize) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = (completed, total);
        }
    }

    #[tokio::test]
    async fn test_offsets_shift_by_chunk_index() {
        let transcriber = MockTranscriber { fail_on_index: None };
        // 250s of audio in 100s windows: 3 chunks
        let audio = silent_wav(250.0);
        let options = TranscribeOptions { chunk_secs: 100.0 };

        let merged = create_transcription(&transcriber, &audio, &options, &NoProgress)
            .await
            .unwrap();

        assert_eq!(merged.segments.len(), 3);
        assert_eq!(merged.segments[0].start, 30.0);
        assert_eq!(merged.segments[1].start, 130.0);
        assert_eq!(merged.segments[2].start, 230.0);
        assert_eq!(merged.segments[2].end, 235.0);
    }

    #[tokio::test]
    async fn test_text_is_trimmed_and_order_preserved() {
        let transcriber = MockTranscriber { fail_on_index: None };
        let audio = silent_wav(20.0);
        let options = TranscribeOptions { chunk_secs: 10.0 };

        let merged = create_transcription(&transcriber, &audio, &options, &NoProgress)
            .await
            .unwrap();

        assert_eq!(merged.segments[0].text, "chunk 0 speech");
        assert_eq!(merged.segments[1].text, "chunk 1 speech");
        for pair in merged.segments.windows(2) {
            assert!(pair[1].start >= pair[0].start);
        }
    }

    #[tokio::test]
    async fn test_subtitle_text_is_sequential() {
        let transcriber = MockTranscriber { fail_on_index: None };
        let audio = silent_wav(20.0);
        let options = TranscribeOptions { chunk_secs: 10.0 };

        let merged = create_transcription(&transcriber, &audio, &options, &NoProgress)
            .await
            .unwrap();

        assert!(merged.subtitle_text.starts_with("1\n00:00:30,000 --> 00:00:35,000\nchunk 0 speech\n"));
        assert!(merged.subtitle_text.contains("\n2\n00:00:40,000 --> 00:00:45,000\nchunk 1 speech\n"));
    }

    #[tokio::test]
    async fn test_chunk_failure_fails_whole_operation() {
        let transcriber = MockTranscriber {
            fail_on_index: Some(1),
        };
        let audio = silent_wav(30.0);
        let options = TranscribeOptions { chunk_secs: 10.0 };

        let result = create_transcription(&transcriber, &audio, &options, &NoProgress).await;
        assert!(matches!(result, Err(VidsumError::Transcription(_))));
    }

    #[tokio::test]
    async fn test_progress_reported_per_chunk() {
        let transcriber = MockTranscriber { fail_on_index: None };
        let sink = CountingSink {
            calls: AtomicUsize::new(0),
            last: Mutex::new((0, 0)),
        };
        let audio = silent_wav(45.0);
        let options = TranscribeOptions { chunk_secs: 10.0 };

        create_transcription(&transcriber, &audio, &options, &sink)
            .await
            .unwrap();

        assert_eq!(sink.calls.load(Ordering::SeqCst), 5);
        assert_eq!(*sink.last.lock().unwrap(), (5, 5));
    }

    #[tokio::test]
    async fn test_undecodable_bytes_fail_with_decode_error() {
        let transcriber = MockTranscriber { fail_on_index: None };
        let options = TranscribeOptions::default();

        let result =
            create_transcription(&transcriber, b"not audio", &options, &NoProgress).await;
        assert!(matches!(result, Err(VidsumError::Decode(_))));
    }
}
