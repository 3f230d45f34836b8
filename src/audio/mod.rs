pub mod chunk;
pub mod extract;

pub use chunk::{decode_wav, split_into_chunks};
pub use extract::{check_ffmpeg, check_ffprobe, extract_audio, get_media_duration};

/// Decoded PCM audio held in memory.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Interleaved 16-bit samples.
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    /// Total duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        let frames = self.samples.len() / self.channels as usize;
        frames as f64 / self.sample_rate as f64
    }
}

/// One fixed-duration window of the source audio, ready for transcription.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub buffer: AudioBuffer,
    pub index: usize,
}

impl AudioChunk {
    /// Duration of this chunk in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.buffer.duration_secs()
    }
}
