//! Text generation
//!
//! A [`ResponseGenerator`] turns one prompt into one reply. Requests are
//! single-turn: no conversation history is sent.

mod openai;

pub use openai::OpenAiGenerator;

use async_trait::async_trait;

use crate::Result;

/// Trait for reply generation backends
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Generate a reply for a single prompt
    ///
    /// The returned text has surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns error if the backend request fails or yields no reply
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
