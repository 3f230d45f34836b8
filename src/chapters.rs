//! Chapter extraction from generated summary text.
//!
//! Summaries embed chapter headers in the fixed convention
//! `#### N. Title (MM:SS–MM:SS)`. Extraction is a best-effort
//! single-pass regex scan: matches are emitted in document order and
//! the numeric label is part of the match boundary only, never
//! validated or returned.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Result, VidsumError};

/// A user-navigable section of a generated summary.
///
/// `start` and `end` are the raw `MM:SS` strings as they appeared in
/// the text; convert with [`timestamp_to_seconds`] for seeking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub start: String,
    pub end: String,
}

fn chapter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Range separator is an en dash or an ASCII hyphen.
        Regex::new(r"####\s+\d+\.\s+(?P<title>.+?)\s+\((?P<start>\d+:\d+)[–-](?P<end>\d+:\d+)\)")
            .expect("Invalid regex")
    })
}

/// Scan `markdown` for chapter headers, in document order.
///
/// Never fails; text without headers yields an empty list. No
/// deduplication and no ordering or overlap validation is performed.
pub fn extract_chapters(markdown: &str) -> Vec<Chapter> {
    chapter_re()
        .captures_iter(markdown)
        .map(|caps| Chapter {
            title: caps["title"].trim().to_string(),
            start: caps["start"].to_string(),
            end: caps["end"].to_string(),
        })
        .collect()
}

/// Convert a `MM:SS` timestamp into total seconds.
pub fn timestamp_to_seconds(ts: &str) -> Result<u32> {
    let (minutes, seconds) = ts
        .split_once(':')
        .ok_or_else(|| VidsumError::Timestamp(ts.to_string()))?;

    let minutes: u32 = minutes
        .parse()
        .map_err(|_| VidsumError::Timestamp(ts.to_string()))?;
    let seconds: u32 = seconds
        .parse()
        .map_err(|_| VidsumError::Timestamp(ts.to_string()))?;

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(|| VidsumError::Timestamp(ts.to_string()))
}
