pub mod audio;
pub mod chapters;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod subtitle;
pub mod summarize;
pub mod transcribe;
pub mod youtube;

pub use chapters::{extract_chapters, timestamp_to_seconds, Chapter};
pub use config::Config;
pub use error::{Result, VidsumError};
pub use pipeline::{summarize_transcript, transcribe_file, youtube_caption_text, SummaryReport};
pub use transcribe::{create_transcription, MergedTranscript, TranscriptSegment};
