//! TOML configuration file loading
//!
//! Supports `~/.config/parley/config.toml` as a persistent config source.
//! All fields are optional: the file is a partial overlay on top of defaults.
//! Credentials are never read from the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfigFile {
    /// Chat completion settings
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Speech recognition settings
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// Microphone endpointing thresholds
    #[serde(default)]
    pub listen: ListenFileConfig,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: Option<String>,

    /// API base URL (e.g. `<https://api.openai.com/v1>`)
    pub base_url: Option<String>,
}

/// Speech recognition configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    /// BCP-47 recognition language (e.g. "en-US")
    pub language: Option<String>,

    /// Full base URL replacing the regional Azure host
    pub endpoint: Option<String>,
}

/// Endpointing thresholds, all durations in milliseconds
#[derive(Debug, Default, Deserialize)]
pub struct ListenFileConfig {
    /// Wait for speech before giving up, in ms (default 5000)
    pub initial_silence_ms: Option<u64>,

    /// Trailing silence that ends an utterance, in ms (default 800)
    pub end_silence_ms: Option<u64>,

    /// Hard cap on utterance length, in ms (default 15000)
    pub max_utterance_ms: Option<u64>,

    /// Shortest burst counted as speech, in ms (default 300)
    pub min_speech_ms: Option<u64>,

    /// RMS level in `[0, 1]` above which audio counts as speech (default 0.02)
    pub energy_threshold: Option<f32>,
}

/// Parse a config file from a string
///
/// # Errors
///
/// Returns error if the content is not valid TOML for this schema
pub fn parse_config_file(content: &str) -> Result<ParleyConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Load a config file the user pointed at explicitly
///
/// # Errors
///
/// Returns error if the file is missing, unreadable, or invalid
pub fn load_explicit(path: &Path) -> Result<ParleyConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("cannot read config file {}: {e}", path.display()))
    })?;
    let config = parse_config_file(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Load the TOML config file from the standard path
///
/// Returns `ParleyConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file() -> ParleyConfigFile {
    let Some(path) = config_file_path() else {
        return ParleyConfigFile::default();
    };

    if !path.exists() {
        return ParleyConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match parse_config_file(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ParleyConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ParleyConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/parley/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "parley", "parley")
        .map(|d| d.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = parse_config_file("").unwrap();
        assert!(config.llm.model.is_none());
        assert!(config.speech.language.is_none());
        assert!(config.listen.end_silence_ms.is_none());
    }

    #[test]
    fn test_partial_overlay() {
        let config = parse_config_file(
            r#"
            [llm]
            model = "gpt-4o"

            [listen]
            end_silence_ms = 1200
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o"));
        assert!(config.llm.base_url.is_none());
        assert_eq!(config.listen.end_silence_ms, Some(1200));
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(parse_config_file("[api_keys]\nopenai = \"sk-test\"").is_err());
    }
}
