//! Errors raised while adapting a raw payload into a [`correlation::PushEvent`].

use thiserror::Error;

/// A webhook body that could not be turned into a push event.
///
/// The processor logs these and treats the delivery as ignorable; they never
/// propagate past [`crate::PushHookProcessor::process`].
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The body is not valid JSON or does not have the expected shape.
    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A field needed to identify the repository is absent or empty.
    #[error("Missing or empty field '{field}'")]
    MissingField {
        /// Dotted JSON path of the field (e.g. `"repository.full_name"`).
        field: &'static str,
    },

    /// A ref change violates the created/closed/updated shape rules.
    #[error("Change #{index} is malformed: {reason}")]
    MalformedChange {
        /// Zero-based position of the change in the payload.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },
}
