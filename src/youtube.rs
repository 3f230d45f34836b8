//! YouTube collaborators: video id parsing, caption fetching, and
//! yt-dlp metadata.

use std::collections::VecDeque;
use std::process::Command;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{Result, VidsumError};

/// Default timedtext host.
const TIMEDTEXT_BASE_URL: &str = "https://www.youtube.com";

/// Extract a YouTube video id from a URL.
///
/// Handles `youtu.be/<id>` short links, `watch?v=<id>`, and
/// `/embed/<id>`, `/shorts/<id>`, `/live/<id>` paths. Returns `None`
/// for anything else.
pub fn video_id(url_str: &str) -> Option<String> {
    let url = Url::parse(url_str).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();

    if host == "youtu.be" || host == "www.youtu.be" {
        let id = url.path_segments()?.next()?.trim();
        if !id.is_empty() {
            return Some(id.to_string());
        }
        return None;
    }

    if host != "youtube.com" && host != "www.youtube.com" && host != "m.youtube.com" {
        return None;
    }

    for (key, value) in url.query_pairs() {
        if key == "v" && !value.trim().is_empty() {
            return Some(value.trim().to_string());
        }
    }

    let mut segments: VecDeque<&str> = url.path_segments()?.collect();
    let first = segments.pop_front().unwrap_or("");
    if matches!(first, "embed" | "shorts" | "live") {
        let id = segments.pop_front().unwrap_or("").trim();
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }

    None
}

/// One caption record from the timedtext track.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: String,
    /// Start offset in seconds.
    pub start: f64,
    /// Display duration in seconds.
    pub duration: f64,
}

/// Join captions into one plain-text block for summarization input.
pub fn captions_to_text(captions: &[Caption]) -> String {
    captions
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fetches caption tracks from the timedtext endpoint (JSON3 format).
pub struct CaptionClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for CaptionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptionClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: TIMEDTEXT_BASE_URL.to_string(),
        }
    }

    /// Override the endpoint host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the caption track for `video_id` in `lang`.
    ///
    /// `Ok(None)` means the video has no captions in that language;
    /// blocked or failed requests are an `Api` error.
    pub async fn fetch_captions(
        &self,
        video_id: &str,
        lang: &str,
    ) -> Result<Option<Vec<Caption>>> {
        let url = format!(
            "{}/api/timedtext?v={}&lang={}&fmt=json3",
            self.base_url, video_id, lang
        );

        debug!("Fetching captions for {} ({})", video_id, lang);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            return Err(VidsumError::Api(format!(
                "Caption request blocked ({status})"
            )));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VidsumError::Api(format!(
                "Caption request failed ({status}): {body}"
            )));
        }

        let body = response.text().await?;
        // The endpoint answers 200 with an empty body when no track exists.
        if body.trim().is_empty() {
            return Ok(None);
        }

        let track: TimedTextTrack = serde_json::from_str(&body)?;
        let captions: Vec<Caption> = track
            .events
            .into_iter()
            .filter_map(|event| {
                let segs = event.segs?;
                let text: String = segs.into_iter().filter_map(|s| s.utf8).collect();
                let text = text.trim().to_string();
                if text.is_empty() {
                    return None;
                }
                Some(Caption {
                    text,
                    start: event.t_start_ms as f64 / 1000.0,
                    duration: event.d_duration_ms.unwrap_or(0) as f64 / 1000.0,
                })
            })
            .collect();

        if captions.is_empty() {
            return Ok(None);
        }

        Ok(Some(captions))
    }
}

/// Metadata reported by yt-dlp for one video.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub upload_date: String,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Fetch video metadata by shelling out to `yt-dlp -J`.
pub fn fetch_metadata(url: &str) -> Result<VideoMetadata> {
    let output = Command::new("yt-dlp")
        .args(["-J", "--no-warnings"])
        .arg(url)
        .output()
        .map_err(|e| {
            VidsumError::Api(format!(
                "yt-dlp not found. Please install yt-dlp and ensure it's in your PATH. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VidsumError::Api(format!("yt-dlp failed: {stderr}")));
    }

    let metadata: VideoMetadata = serde_json::from_slice(&output.stdout)?;
    Ok(metadata)
}

// Timedtext JSON3 wire types

#[derive(Debug, Deserialize)]
struct TimedTextTrack {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(rename = "tStartMs", default)]
    t_start_ms: u64,
    #[serde(rename = "dDurationMs")]
    d_duration_ms: Option<u64>,
    segs: Option<Vec<TimedTextSeg>>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    utf8: Option<String>,
}
