//! Azure Speech short-audio recognition
//!
//! Sends one WAV recording to the regional REST endpoint and maps the
//! service's `RecognitionStatus` onto [`RecognitionResult`].
//!
//! See: <https://learn.microsoft.com/en-us/azure/ai-services/speech-service/rest-speech-to-text-short>

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::capture::{SAMPLE_RATE, samples_to_wav};
use super::recognizer::{
    AudioSource, CancellationReason, NoMatchReason, RecognitionResult, Recognizer, Recording,
};
use crate::config::SpeechConfig;
use crate::{Error, Result};

/// Path of the conversation-mode recognition endpoint
const RECOGNITION_PATH: &str = "/speech/recognition/conversation/cognitiveservices/v1";

/// Header carrying the subscription key
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Simple-format response from the short-audio endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SimpleRecognitionResponse {
    recognition_status: String,
    #[serde(default)]
    display_text: Option<String>,
}

impl SimpleRecognitionResponse {
    fn into_result(self) -> RecognitionResult {
        match self.recognition_status.as_str() {
            "Success" => match self.display_text {
                Some(text) if !text.trim().is_empty() => RecognitionResult::RecognizedSpeech { text },
                _ => RecognitionResult::NoMatch {
                    reason: NoMatchReason::NotRecognized,
                },
            },
            "NoMatch" => RecognitionResult::NoMatch {
                reason: NoMatchReason::NotRecognized,
            },
            "InitialSilenceTimeout" => RecognitionResult::NoMatch {
                reason: NoMatchReason::InitialSilenceTimeout,
            },
            "BabbleTimeout" => RecognitionResult::NoMatch {
                reason: NoMatchReason::InitialBabbleTimeout,
            },
            "Error" => RecognitionResult::error("speech service reported a recognition error"),
            other => RecognitionResult::error(format!("unexpected recognition status: {other}")),
        }
    }
}

/// Client for the Azure Speech short-audio REST API
pub struct AzureSpeechClient {
    client: reqwest::Client,
    url: Url,
    subscription_key: SecretString,
    language: String,
}

impl AzureSpeechClient {
    /// Create a client from speech configuration
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint URL is invalid, the language is empty,
    /// or the HTTP client cannot be built
    pub fn new(config: SpeechConfig) -> Result<Self> {
        if config.language.trim().is_empty() {
            return Err(Error::Config(
                "speech recognition language must not be empty".to_string(),
            ));
        }

        let base = config.endpoint.clone().unwrap_or_else(|| {
            format!("https://{}.stt.speech.microsoft.com", config.region)
        });
        let url = Url::parse(&format!("{}{RECOGNITION_PATH}", base.trim_end_matches('/')))
            .map_err(|e| Error::Config(format!("invalid speech endpoint {base}: {e}")))?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        tracing::debug!(
            region = %config.region,
            language = %config.language,
            url = %url,
            "Azure speech client configured"
        );

        Ok(Self {
            client,
            url,
            subscription_key: config.subscription_key,
            language: config.language,
        })
    }

    /// The recognition endpoint this client posts to
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Recognize a single WAV utterance
    ///
    /// # Arguments
    ///
    /// * `audio` - 16 kHz mono 16-bit PCM WAV bytes
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, a non-success HTTP status, or an
    /// undecodable response body
    pub async fn recognize(&self, audio: &[u8]) -> Result<RecognitionResult> {
        tracing::debug!(audio_bytes = audio.len(), "starting Azure recognition");

        let response = self
            .client
            .post(self.url.clone())
            .query(&[("language", self.language.as_str()), ("format", "simple")])
            .header(SUBSCRIPTION_KEY_HEADER, self.subscription_key.expose_secret())
            .header(
                CONTENT_TYPE,
                format!("audio/wav; codecs=audio/pcm; samplerate={SAMPLE_RATE}"),
            )
            .header(ACCEPT, "application/json")
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Azure speech request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Azure speech API error");
            return Err(Error::Stt(format!("Azure speech API error {status}: {body}")));
        }

        let body: SimpleRecognitionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Azure speech response");
            e
        })?;

        tracing::debug!(status = %body.recognition_status, "recognition finished");
        Ok(body.into_result())
    }
}

/// Recognizer that records from an [`AudioSource`] and asks Azure
pub struct AzureRecognizer<S> {
    source: S,
    client: AzureSpeechClient,
}

impl<S: AudioSource> AzureRecognizer<S> {
    /// Combine an audio source with a speech client
    #[must_use]
    pub const fn new(source: S, client: AzureSpeechClient) -> Self {
        Self { source, client }
    }
}

#[async_trait(?Send)]
impl<S: AudioSource> Recognizer for AzureRecognizer<S> {
    async fn recognize_once(&mut self) -> RecognitionResult {
        let samples = match self.source.record_utterance().await {
            Ok(Recording::Speech(samples)) => samples,
            Ok(Recording::InitialSilence) => {
                return RecognitionResult::NoMatch {
                    reason: NoMatchReason::InitialSilenceTimeout,
                };
            }
            Ok(Recording::EndOfStream) => {
                return RecognitionResult::Canceled {
                    reason: CancellationReason::EndOfStream,
                    error_details: None,
                };
            }
            Err(e) => {
                tracing::error!(error = %e, "recording failed");
                return RecognitionResult::error(e.to_string());
            }
        };

        let wav = match samples_to_wav(&samples, SAMPLE_RATE) {
            Ok(wav) => wav,
            Err(e) => return RecognitionResult::error(e.to_string()),
        };

        match self.client.recognize(&wav).await {
            Ok(result) => result,
            Err(e) => RecognitionResult::error(e.to_string()),
        }
    }
}
