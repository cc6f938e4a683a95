//! Parley - a voice-driven chat loop
//!
//! Speak into the microphone, have the utterance transcribed by Azure
//! Speech, send the text to an `OpenAI` chat model, and print the reply.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               InteractionLoop                │
//! │  capture → generate → print → continue?      │
//! └──────┬──────────────────────────┬────────────┘
//!        │                          │
//! ┌──────▼────────────┐    ┌────────▼───────────┐
//! │   SpeechCapture   │    │ ResponseGenerator  │
//! │ mic → WAV → Azure │    │ OpenAI completions │
//! └───────────────────┘    └────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod interaction;
pub mod llm;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use interaction::{InteractionLoop, LoopState};
pub use llm::{OpenAiGenerator, ResponseGenerator};
pub use voice::{Outcome, SpeechCapture, Utterance};
