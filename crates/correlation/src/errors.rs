//! Top-level error type for the correlation domain.
//!
//! Nothing on the matching or projection path fails: ignorable input and data
//! gaps resolve to "no applicable work" or a lenient default. [`HookRelayError`]
//! therefore only covers conditions raised while assembling the system, such
//! as an invalid watcher declaration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing watchers or configuring the relay.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum HookRelayError {
    /// A watcher declaration is missing a required field or carries an empty one.
    ///
    /// Produced by: [`crate::watcher::Navigator::new`] and
    /// [`crate::watcher::Source::new`].
    #[error("Invalid watcher: {field} must not be empty")]
    InvalidWatcher {
        /// Name of the offending field (e.g. `"owner"`).
        field: String,
    },

    /// The relay configuration is invalid.
    ///
    /// Produced at load time; the relay never starts with an invalid config.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },
}
