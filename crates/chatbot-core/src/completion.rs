use async_trait::async_trait;
use thiserror::Error;

/// The one failure a completion request can have. The cause is kept for the
/// log line; callers treat every cause the same way.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Network(String),

    #[error("completion request failed: service returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("completion request failed: malformed response: {0}")]
    Malformed(String),
}

impl CompletionError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn rejected(status: u16, msg: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: msg.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::malformed(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

/// A hosted model that maps a prompt to generated text.
///
/// Implementors own transport, credentials and wire format; the conversation
/// controller only ever sees a prompt going in and text or an error coming out.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    /// Model identifier, for display
    fn model(&self) -> &str;
}
