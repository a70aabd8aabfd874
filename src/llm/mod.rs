//! Completion provider abstraction over the generative backend.
//!
//! Providers return a typed [`CompletionError`]; conversion to the
//! user-facing "Sorry, I encountered an error" string happens where the reply
//! is stored, not here.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

/// Instructional preamble wrapped around every user message before dispatch.
pub(crate) const PERSONA_PREAMBLE: &str = "\
You are a friendly, polite, and highly intelligent AI assistant.
Keep responses short, conversational, and well-formatted.
Use proper spacing, line breaks, and formatting where appropriate.
Make your responses engaging and helpful.";

#[derive(Debug, Error)]
pub enum CompletionError {
    /// Network-level failure, including a hit request timeout.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with an error, either a non-2xx status or an
    /// error object embedded in the body.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// A 2xx response that carried no usable reply text.
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a reply to a single user message.
    async fn complete(&self, user_message: &str) -> Result<String, CompletionError>;
}
