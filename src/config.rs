use crate::error::{Result, VidsumError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Transcript rendering selected for summarization input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptFormat {
    /// One segment text per line.
    #[default]
    Plain,
    /// `[MM:SS – MM:SS] text` per line.
    Timestamped,
    /// SRT subtitle blocks.
    Srt,
}

impl std::fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptFormat::Plain => write!(f, "plain"),
            TranscriptFormat::Timestamped => write!(f, "timestamped"),
            TranscriptFormat::Srt => write!(f, "srt"),
        }
    }
}

impl std::str::FromStr for TranscriptFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(TranscriptFormat::Plain),
            "timestamped" => Ok(TranscriptFormat::Timestamped),
            "srt" => Ok(TranscriptFormat::Srt),
            _ => Err(format!(
                "Unknown format: {}. Use 'plain', 'timestamped', or 'srt'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub openai_api_key: Option<String>,
    /// Chat model used for summary generation.
    pub chat_model: String,
    /// Speech-to-text model used per audio chunk.
    pub transcribe_model: String,
    /// Natural language the summary is written in.
    pub language: String,
    /// Fixed chunk window length in minutes.
    pub chunk_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            chat_model: "gpt-4o".to_string(),
            transcribe_model: "whisper-1".to_string(),
            language: "English".to_string(),
            chunk_minutes: 15,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.openai_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("VIDSUM_CHAT_MODEL") {
            config.chat_model = model;
        }
        if let Ok(model) = std::env::var("VIDSUM_TRANSCRIBE_MODEL") {
            config.transcribe_model = model;
        }
        if let Ok(language) = std::env::var("VIDSUM_LANGUAGE") {
            config.language = language;
        }
        if let Ok(minutes) = std::env::var("VIDSUM_CHUNK_MINUTES") {
            if let Ok(m) = minutes.parse() {
                config.chunk_minutes = m;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.is_none() {
            return Err(VidsumError::Config(
                "OPENAI_API_KEY not set. Export it with: export OPENAI_API_KEY=sk-...".to_string(),
            ));
        }

        if self.chunk_minutes == 0 {
            return Err(VidsumError::Config(
                "Chunk length must be greater than 0 minutes".to_string(),
            ));
        }

        Ok(())
    }

    /// Chunk window length in whole seconds.
    pub fn chunk_seconds(&self) -> f64 {
        (self.chunk_minutes * 60) as f64
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vidsum").join("config.toml"))
    }
}
