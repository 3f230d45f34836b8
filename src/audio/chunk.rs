use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::error::{Result, VidsumError};

use super::{AudioBuffer, AudioChunk};

/// Decode WAV bytes into a single in-memory PCM buffer.
pub fn decode_wav(audio_bytes: &[u8]) -> Result<AudioBuffer> {
    let mut reader = WavReader::new(Cursor::new(audio_bytes))
        .map_err(|e| VidsumError::Decode(format!("Not a decodable WAV stream: {e}")))?;

    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(VidsumError::Decode(format!(
            "Unsupported sample format: {:?} {}-bit (expected 16-bit PCM)",
            spec.sample_format, spec.bits_per_sample
        )));
    }

    let samples: std::result::Result<Vec<i16>, _> = reader.samples::<i16>().collect();
    let samples =
        samples.map_err(|e| VidsumError::Decode(format!("Failed to read samples: {e}")))?;

    Ok(AudioBuffer {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Split decoded audio into consecutive fixed-duration windows.
///
/// Every window is exactly `chunk_secs` long except the last, which may
/// be shorter when the total duration is not an exact multiple.
pub fn split_into_chunks(audio_bytes: &[u8], chunk_secs: f64) -> Result<Vec<AudioChunk>> {
    let buffer = decode_wav(audio_bytes)?;

    let frames_per_chunk = (chunk_secs * buffer.sample_rate as f64) as usize;
    let samples_per_chunk = frames_per_chunk * buffer.channels as usize;
    if samples_per_chunk == 0 {
        return Err(VidsumError::Decode(
            "Chunk duration too short for sample rate".to_string(),
        ));
    }

    let chunks: Vec<AudioChunk> = buffer
        .samples
        .chunks(samples_per_chunk)
        .enumerate()
        .map(|(index, window)| AudioChunk {
            buffer: AudioBuffer {
                samples: window.to_vec(),
                sample_rate: buffer.sample_rate,
                channels: buffer.channels,
            },
            index,
        })
        .collect();

    debug!(
        "Split {:.1}s of audio into {} chunks of {}s",
        buffer.duration_secs(),
        chunks.len(),
        chunk_secs
    );

    Ok(chunks)
}

impl AudioChunk {
    /// Re-encode this chunk as a standalone WAV byte stream for upload.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = WavSpec {
            channels: self.buffer.channels,
            sample_rate: self.buffer.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec)
                .map_err(|e| VidsumError::Decode(format!("Failed to encode chunk: {e}")))?;
            for &sample in &self.buffer.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| VidsumError::Decode(format!("Failed to encode chunk: {e}")))?;
            }
            writer
                .finalize()
                .map_err(|e| VidsumError::Decode(format!("Failed to encode chunk: {e}")))?;
        }

        Ok(cursor.into_inner())
    }
}
