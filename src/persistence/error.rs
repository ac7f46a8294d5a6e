//! Error types for the persistence layer.
//!
//! None of these reach gameplay: [`super::ScorePersistence`] logs them and
//! falls back to defaults.

/// Errors that can occur while reading or writing scores.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// No storage backend (private mode, sandboxed iframe, ...).
    #[error("Storage unavailable")]
    StorageUnavailable,

    /// A stored value could not be interpreted.
    #[error("Invalid stored value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote store answered with a non-success status.
    #[error("Remote store returned HTTP {status}")]
    Http { status: u16 },

    /// A browser API call failed.
    #[error("JavaScript error: {0}")]
    Js(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failing_layer() {
        assert_eq!(
            PersistenceError::Js("no window".into()).to_string(),
            "JavaScript error: no window"
        );
        assert_eq!(
            PersistenceError::StorageUnavailable.to_string(),
            "Storage unavailable"
        );
        assert_eq!(
            PersistenceError::Http { status: 503 }.to_string(),
            "Remote store returned HTTP 503"
        );
    }
}
