use std::fmt;

/// Failure kinds surfaced by ingestion and dispatch. Nothing here is retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChatError {
    #[error("nothing to send: message is empty and no document is attached")]
    Validation,
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("extraction failed: {0}")]
    ExtractionFailure(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Upstream { status: Option<u16>, message: String },
    #[error("completion response contained no choices")]
    EmptyResponse,
    #[error("a message is already being sent")]
    Busy,
}

impl ChatError {
    /// One sentence suitable for showing to the person typing.
    pub fn notice(&self) -> String {
        match self {
            ChatError::Validation => "Type a message or attach a document first.".to_string(),
            ChatError::UnsupportedFormat(_) => "Only PDF documents can be attached.".to_string(),
            ChatError::ExtractionFailure(_) => {
                "The document could not be read. It may be damaged or protected.".to_string()
            }
            ChatError::Network(_) => {
                "Could not reach the AI service. Check your connection and try again.".to_string()
            }
            ChatError::Upstream { message, .. } => {
                format!("The AI service returned an error: {}", message)
            }
            ChatError::EmptyResponse => {
                "The AI service returned an empty answer. Please try again.".to_string()
            }
            ChatError::Busy => "Please wait for the current answer to finish.".to_string(),
        }
    }
}

/// Extra guidance attached to a failed dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// The request carried a document above the page threshold, the most
    /// common reason for an upstream rejection.
    OversizedDocument {
        source_name: String,
        total_page_count: usize,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::OversizedDocument {
                source_name,
                total_page_count,
            } => write!(
                f,
                "'{}' has {} pages and is likely too large. Try a smaller document or fewer pages.",
                source_name, total_page_count
            ),
        }
    }
}

/// A failed dispatch: the underlying error plus an optional advisory.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error}")]
pub struct DispatchError {
    #[source]
    pub error: ChatError,
    pub advisory: Option<Advisory>,
}

impl From<ChatError> for DispatchError {
    fn from(error: ChatError) -> Self {
        Self {
            error,
            advisory: None,
        }
    }
}
