//! Error taxonomy for the annotation core.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A submitted answer set failed validation against the current schema.
    ///
    /// Carries the first offending question key (in schema order) so the
    /// caller can re-prompt for exactly that question.
    #[error("Validation failed for question '{question}': {reason}")]
    Validation { question: String, reason: String },

    /// An image id outside the current image set was referenced.
    ///
    /// Signals stale client state, not a server fault.
    #[error("Unknown image: {image_id}")]
    UnknownImage { image_id: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A storage backend failure. The message is backend-specific and is
    /// sanitized before it reaches any caller-facing response.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::Validation`] against a question key.
    pub fn validation(question: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            question: question.into(),
            reason: reason.into(),
        }
    }
}
