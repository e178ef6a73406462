use thiserror::Error;

/// Custom error type for lorecall operations.
///
/// These errors circulate between the retrieval controller and its
/// collaborators (turn provider, chapter answerer). They never escape
/// [`retrieve`](crate::retrieval::ContextRetriever::retrieve), which degrades
/// to a partial result instead of failing the call.
#[derive(Debug, Error)]
pub enum LorecallError {
    /// The model turn provider failed (transport or provider error).
    #[error("Provider error: {message}")]
    Provider {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation was cancelled via the caller's cancellation signal.
    #[error("Cancelled")]
    Cancelled,

    /// An externally supplied chapter-answering delegate failed.
    /// The dispatcher recovers by falling back to chapter summaries.
    #[error("Answerer error: {0}")]
    Answerer(String),

    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl LorecallError {
    /// Build a provider error from a message, without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        LorecallError::Provider {
            message: message.into(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for LorecallError {
    fn from(err: serde_json::Error) -> Self {
        LorecallError::Validation(format!("JSON serialization error: {}", err))
    }
}
