//! Transcript renderings: SRT blocks, plain text, and `[MM:SS – MM:SS]`
//! timestamped lines.

use crate::config::TranscriptFormat;
use crate::transcribe::TranscriptSegment;

/// Render segments as sequential 1-indexed SRT blocks separated by a
/// blank line.
pub fn render_srt(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                i + 1,
                format_srt_timestamp(segment.start),
                format_srt_timestamp(segment.end),
                segment.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render segments as plain text, one segment per line.
pub fn render_plain(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render segments as `[MM:SS – MM:SS] text` lines.
pub fn render_timestamped(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| {
            format!(
                "[{} – {}] {}",
                format_mmss(s.start),
                format_mmss(s.end),
                s.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render segments in the requested format.
pub fn render(segments: &[TranscriptSegment], format: TranscriptFormat) -> String {
    match format {
        TranscriptFormat::Plain => render_plain(segments),
        TranscriptFormat::Timestamped => render_timestamped(segments),
        TranscriptFormat::Srt => render_srt(segments),
    }
}

/// `HH:MM:SS,mmm`, zero-padded, milliseconds rounded from the
/// fractional remainder.
fn format_srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// `MM:SS` from the integer part of the seconds value.
fn format_mmss(seconds: f64) -> String {
    let total = seconds as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
