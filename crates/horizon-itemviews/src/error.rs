//! Error types for item views.

/// Result type alias for item view operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while wiring models together.
///
/// Queries never fail with an error; they return invalid indices instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The selection model observes a different model than the proxy source,
    /// and no selection mapper translates between them.
    #[error("selection model does not observe the source model and no selection mapper is set")]
    SelectionModelMismatch,

    /// The source model has been dropped.
    #[error("source model has been dropped")]
    SourceDropped,

    /// A filter behavior name could not be parsed.
    #[error("unknown filter behavior '{0}'")]
    UnknownFilterBehavior(String),
}

impl Error {
    /// Create an unknown filter behavior error.
    pub fn unknown_filter_behavior(name: impl Into<String>) -> Self {
        Self::UnknownFilterBehavior(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::unknown_filter_behavior("flat").to_string(),
            "unknown filter behavior 'flat'"
        );
        assert_eq!(Error::SourceDropped.to_string(), "source model has been dropped");
    }
}
