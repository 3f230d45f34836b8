//! Integration tests for vidsum
//!
//! These tests validate the integration between components without requiring
//! external API keys.

use async_trait::async_trait;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;
use vidsum::audio::{split_into_chunks, AudioChunk};
use vidsum::chapters::{extract_chapters, timestamp_to_seconds};
use vidsum::error::{Result, VidsumError};
use vidsum::subtitle;
use vidsum::transcribe::{
    create_transcription, ChunkTranscript, NoProgress, TranscribeOptions, Transcriber,
    TranscriptSegment,
};

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

// ============================================================================
// Chunking properties
// ============================================================================

mod chunking {
    use super::*;

    #[test]
    fn splits_into_ceil_d_over_c_chunks() {
        // D=3600s, C=900s: exactly 4 chunks of 900s
        let chunks = split_into_chunks(&silent_wav(3600.0), 900.0).unwrap();
        assert_eq!(chunks.len(), 4);
        for chunk in &chunks {
            assert!((chunk.duration_secs() - 900.0).abs() < 1e-9);
        }

        // D=2000s, C=900s: ceil(2000/900)=3, tail = 2000 - 1800 = 200s
        let chunks = split_into_chunks(&silent_wav(2000.0), 900.0).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!((chunks[0].duration_secs() - 900.0).abs() < 1e-9);
        assert!((chunks[2].duration_secs() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn chunk_indexes_are_sequential_from_zero() {
        let chunks = split_into_chunks(&silent_wav(95.0), 30.0).unwrap();
        let indexes: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn undecodable_input_is_a_decode_error() {
        let result = split_into_chunks(b"\x00\x01garbage", 900.0);
        assert!(matches!(result, Err(VidsumError::Decode(_))));
    }
}

// ============================================================================
// Merge offsetting
// ============================================================================

mod merging {
    use super::*;

    /// Emits one fixed chunk-local segment per chunk.
    struct FixedSegment {
        start: f64,
        end: f64,
    }

    #[async_trait]
    impl Transcriber for FixedSegment {
        async fn transcribe(&self, chunk: &AudioChunk) -> Result<ChunkTranscript> {
            Ok(ChunkTranscript {
                segments: vec![TranscriptSegment {
                    start: self.start,
                    end: self.end,
                    text: format!("segment of chunk {}", chunk.index),
                }],
            })
        }

        fn name(&self) -> &'static str {
            "FixedSegment"
        }
    }

    #[tokio::test]
    async fn merged_start_is_local_plus_index_times_chunk_secs() {
        // chunk size 900s, chunk index 2, raw start 30.0 -> merged 1830.0
        let transcriber = FixedSegment {
            start: 30.0,
            end: 40.0,
        };
        let audio = silent_wav(2700.0);
        let options = TranscribeOptions { chunk_secs: 900.0 };

        let merged = create_transcription(&transcriber, &audio, &options, &NoProgress)
            .await
            .unwrap();

        assert_eq!(merged.segments.len(), 3);
        assert_eq!(merged.segments[2].start, 1830.0);
        assert_eq!(merged.segments[2].end, 1840.0);
    }

    #[tokio::test]
    async fn merged_segments_are_globally_monotonic() {
        let transcriber = FixedSegment {
            start: 0.5,
            end: 9.5,
        };
        let audio = silent_wav(100.0);
        let options = TranscribeOptions { chunk_secs: 10.0 };

        let merged = create_transcription(&transcriber, &audio, &options, &NoProgress)
            .await
            .unwrap();

        assert_eq!(merged.segments.len(), 10);
        for pair in merged.segments.windows(2) {
            assert!(pair[1].start > pair[0].end);
        }
    }
}

// ============================================================================
// Subtitle rendering
// ============================================================================

mod subtitles {
    use super::*;

    #[test]
    fn srt_boundary_block_is_exact() {
        let segments = vec![TranscriptSegment {
            start: 0.0,
            end: 1.234,
            text: "Hi".to_string(),
        }];
        assert_eq!(
            subtitle::render_srt(&segments),
            "1\n00:00:00,000 --> 00:00:01,234\nHi\n"
        );
    }

    #[test]
    fn timestamped_lines_use_mmss_en_dash() {
        let segments = vec![TranscriptSegment {
            start: 125.0,
            end: 130.4,
            text: "hello".to_string(),
        }];
        assert_eq!(
            subtitle::render_timestamped(&segments),
            "[02:05 – 02:10] hello"
        );
    }
}

// ============================================================================
// Chapter extraction flow
// ============================================================================

mod chapter_flow {
    use super::*;

    const SUMMARY: &str = "\
The talk covers the project history and a live demo.

#### 2. Intro (00:00–01:30)
Speaker introductions and agenda.

#### 1. Body (01:30–05:00)
The main walkthrough.
";

    #[test]
    fn order_follows_text_position_not_labels() {
        let chapters = extract_chapters(SUMMARY);

        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "Intro");
        assert_eq!(chapters[0].start, "00:00");
        assert_eq!(chapters[0].end, "01:30");
        assert_eq!(chapters[1].title, "Body");
        assert_eq!(chapters[1].start, "01:30");
        assert_eq!(chapters[1].end, "05:00");
    }

    #[test]
    fn chapter_timestamps_convert_to_seek_offsets() {
        let chapters = extract_chapters(SUMMARY);
        let offsets: Vec<u32> = chapters
            .iter()
            .map(|c| timestamp_to_seconds(&c.start).unwrap())
            .collect();
        assert_eq!(offsets, vec![0, 90]);
    }

    #[test]
    fn no_headers_is_not_an_error() {
        assert!(extract_chapters("plain text with no headers").is_empty());
    }

    #[test]
    fn unparsable_timestamp_fails_only_that_conversion() {
        let chapters = extract_chapters(SUMMARY);
        let mut converted = 0;
        for chapter in &chapters {
            if timestamp_to_seconds(&chapter.start).is_ok() {
                converted += 1;
            }
        }
        assert_eq!(converted, chapters.len());
        assert!(timestamp_to_seconds("bogus").is_err());
    }
}
