//! Configuration management for Parley
//!
//! Credentials come from the process environment only. Everything else
//! layers CLI/env overrides over the optional TOML file over defaults.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::voice::ListenConfig;
use crate::{Error, Result};

use self::file::{ListenFileConfig, ParleyConfigFile};

/// Environment variable holding the `OpenAI` API key
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable holding the Azure Speech subscription key
pub const AZURE_KEY_VAR: &str = "AZURE_TTS_KEY";

/// Environment variable holding the Azure Speech region
pub const AZURE_REGION_VAR: &str = "AZURE_TTS_REGION";

/// Default chat model
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Default chat completions base URL
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default recognition language
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Parley configuration, resolved once at startup
#[derive(Debug)]
pub struct Config {
    /// Chat completion settings
    pub llm: LlmConfig,

    /// Speech recognition settings
    pub speech: SpeechConfig,

    /// Microphone endpointing thresholds
    pub listen: ListenConfig,
}

/// Chat completion configuration
#[derive(Debug)]
pub struct LlmConfig {
    /// `OpenAI` API key
    pub api_key: SecretString,

    /// Model identifier
    pub model: String,

    /// API base URL, without the `/chat/completions` suffix
    pub base_url: String,
}

impl LlmConfig {
    /// Configuration with the default model and base URL
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            model: DEFAULT_LLM_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    /// Replace the model identifier
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Replace the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Azure Speech configuration
#[derive(Debug)]
pub struct SpeechConfig {
    /// Subscription key
    pub subscription_key: SecretString,

    /// Region identifier (e.g. "eastus")
    pub region: String,

    /// BCP-47 recognition language
    pub language: String,

    /// Base URL replacing the regional host
    pub endpoint: Option<String>,
}

impl SpeechConfig {
    /// Validate credentials and build a speech configuration
    ///
    /// The region is lowercased; it must be non-empty ASCII alphanumerics.
    ///
    /// # Errors
    ///
    /// Returns error if the key or region is empty or malformed
    pub fn new(subscription_key: &str, region: &str, language: &str) -> Result<Self> {
        let key = subscription_key.trim();
        if key.is_empty() {
            return Err(Error::MissingCredential {
                service: "Azure Speech",
                var: AZURE_KEY_VAR,
            });
        }
        if !key.chars().all(|c| c.is_ascii_graphic()) {
            return Err(Error::MalformedCredential {
                var: AZURE_KEY_VAR,
                reason: "key must be printable ASCII without spaces".to_string(),
            });
        }

        let region = region.trim().to_ascii_lowercase();
        if region.is_empty() {
            return Err(Error::MissingCredential {
                service: "Azure Speech",
                var: AZURE_REGION_VAR,
            });
        }
        if !region.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::MalformedCredential {
                var: AZURE_REGION_VAR,
                reason: format!("'{region}' is not a region identifier such as 'eastus'"),
            });
        }

        Ok(Self {
            subscription_key: SecretString::from(key.to_string()),
            region,
            language: language.to_string(),
            endpoint: None,
        })
    }

    /// Point recognition at a different host
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }
}

/// Settings that take precedence over the config file (CLI flags and
/// their environment fallbacks)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Chat model
    pub model: Option<String>,

    /// Recognition language
    pub language: Option<String>,

    /// Explicit config file path
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the environment and config file
    ///
    /// # Errors
    ///
    /// Returns error if a credential is missing or malformed, or if an
    /// explicitly requested config file cannot be loaded
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let file = match &overrides.config_path {
            Some(path) => file::load_explicit(path)?,
            None => file::load_config_file(),
        };

        Self::from_parts(overrides, file, |var| std::env::var(var).ok())
    }

    /// Resolve configuration from explicit parts
    ///
    /// `lookup` reads an environment variable. The generation credential is
    /// checked before the speech credentials.
    ///
    /// # Errors
    ///
    /// Returns error if a credential is missing or malformed, or if the
    /// `[listen]` thresholds are unusable
    pub fn from_parts<F>(overrides: &Overrides, file: ParleyConfigFile, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let openai_key = non_empty(OPENAI_API_KEY_VAR).ok_or(Error::MissingCredential {
            service: "OpenAI",
            var: OPENAI_API_KEY_VAR,
        })?;

        let llm = LlmConfig::new(openai_key.trim())
            .with_model(
                overrides
                    .model
                    .clone()
                    .or(file.llm.model)
                    .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            )
            .with_base_url(
                non_empty("OPENAI_BASE_URL")
                    .or(file.llm.base_url)
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            );

        let azure_key = non_empty(AZURE_KEY_VAR).ok_or(Error::MissingCredential {
            service: "Azure Speech",
            var: AZURE_KEY_VAR,
        })?;
        let azure_region = non_empty(AZURE_REGION_VAR).ok_or(Error::MissingCredential {
            service: "Azure Speech",
            var: AZURE_REGION_VAR,
        })?;

        let language = overrides
            .language
            .clone()
            .or(file.speech.language)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let speech = SpeechConfig::new(&azure_key, &azure_region, &language)?
            .with_endpoint(non_empty("AZURE_SPEECH_ENDPOINT").or(file.speech.endpoint));

        let listen = listen_config(&file.listen)?;

        tracing::debug!(
            model = %llm.model,
            region = %speech.region,
            language = %speech.language,
            "configuration resolved"
        );

        Ok(Self { llm, speech, listen })
    }
}

/// Apply file thresholds over the defaults and validate the result
///
/// # Errors
///
/// Returns error if the merged thresholds are unusable
pub fn listen_config(file: &ListenFileConfig) -> Result<ListenConfig> {
    let defaults = ListenConfig::default();
    let listen = ListenConfig {
        initial_silence: file
            .initial_silence_ms
            .map_or(defaults.initial_silence, Duration::from_millis),
        end_silence: file
            .end_silence_ms
            .map_or(defaults.end_silence, Duration::from_millis),
        max_utterance: file
            .max_utterance_ms
            .map_or(defaults.max_utterance, Duration::from_millis),
        min_speech: file
            .min_speech_ms
            .map_or(defaults.min_speech, Duration::from_millis),
        energy_threshold: file.energy_threshold.unwrap_or(defaults.energy_threshold),
    };
    listen.validate()?;
    Ok(listen)
}
