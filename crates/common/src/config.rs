//! Application configuration and the recording input contract.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which audio sources a recording should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSource {
    /// No audio at all.
    None,
    /// Microphone only.
    Microphone,
    /// System/desktop audio only.
    #[default]
    System,
    /// Microphone and system audio.
    Both,
}

// Unrecognized values coerce to the documented default rather than failing
// the whole configuration.
impl<'de> Deserialize<'de> for AudioSource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "none" => AudioSource::None,
            "microphone" => AudioSource::Microphone,
            "system" => AudioSource::System,
            "both" => AudioSource::Both,
            other => {
                tracing::warn!(value = other, "Unrecognized audioSource, using system");
                AudioSource::System
            }
        })
    }
}

/// Per-session recording request, as supplied by the caller.
///
/// Wire shape: `{ "audioSource": "...", "useWebcam": bool }`. Absent fields
/// take the defaults: system audio, no webcam.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingConfiguration {
    /// Requested audio sources.
    pub audio_source: AudioSource,

    /// Whether to capture the webcam and show the overlay preview.
    pub use_webcam: bool,
}

impl RecordingConfiguration {
    /// Whether a microphone source should be requested.
    pub fn wants_microphone(&self) -> bool {
        matches!(self.audio_source, AudioSource::Microphone | AudioSource::Both)
    }

    /// Whether display/system audio should be requested jointly with the
    /// screen surface.
    pub fn wants_system_audio(&self) -> bool {
        matches!(self.audio_source, AudioSource::System | AudioSource::Both)
    }
}

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default recording settings.
    pub recording: RecordingDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default recording parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingDefaults {
    /// Target video bitrate (bits per second).
    pub video_bits_per_second: u32,

    /// Target audio bitrate (bits per second).
    pub audio_bits_per_second: u32,

    /// Encoded segment cadence in milliseconds.
    pub segment_interval_ms: u64,

    /// State-notification tick period in milliseconds.
    pub tick_interval_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "reelkit=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recording: RecordingDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RecordingDefaults {
    fn default() -> Self {
        Self {
            video_bits_per_second: 1_000_000,
            audio_bits_per_second: 128_000,
            segment_interval_ms: 500,
            tick_interval_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("reelkit").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_configuration_takes_defaults() {
        let config: RecordingConfiguration = serde_json::from_str("{}").unwrap();
        assert_eq!(config.audio_source, AudioSource::System);
        assert!(!config.use_webcam);
    }

    #[test]
    fn known_values_parse() {
        let config: RecordingConfiguration =
            serde_json::from_str(r#"{"audioSource": "both", "useWebcam": true}"#).unwrap();
        assert_eq!(config.audio_source, AudioSource::Both);
        assert!(config.use_webcam);
        assert!(config.wants_microphone());
        assert!(config.wants_system_audio());
    }

    #[test]
    fn unrecognized_audio_source_coerces_to_system() {
        let config: RecordingConfiguration =
            serde_json::from_str(r#"{"audioSource": "speakers"}"#).unwrap();
        assert_eq!(config.audio_source, AudioSource::System);
    }

    #[test]
    fn microphone_only_requests_no_system_audio() {
        let config = RecordingConfiguration {
            audio_source: AudioSource::Microphone,
            use_webcam: false,
        };
        assert!(config.wants_microphone());
        assert!(!config.wants_system_audio());
    }
}
