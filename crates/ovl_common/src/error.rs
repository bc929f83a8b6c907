//! Fatal error taxonomy for view materialization and graph queries.

/// The result type for every fallible view or pass.
///
/// `Err` aborts the current materialization; callers never receive a partial
/// view. Non-fatal conditions are reported through a diagnostic sink instead.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// A fatal failure while deriving metadata from the design graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// A single-instance invariant of the design does not hold (for example
    /// zero or several processing systems).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A name or identifier does not follow the expected convention.
    #[error("format error in `{subject}`: {reason}")]
    Format {
        /// The offending name or identifier.
        subject: String,
        /// What was expected.
        reason: String,
    },

    /// A referenced node or cache entry does not exist.
    #[error("{kind} `{name}` not found")]
    Lookup {
        /// What kind of thing was looked up (e.g. "memory", "core").
        kind: &'static str,
        /// The name that failed to resolve.
        name: String,
    },

    /// A write was attempted through a read-only view.
    #[error("{view} is read only")]
    UnsupportedOperation {
        /// The view that rejected the write.
        view: &'static str,
    },
}

impl MetadataError {
    /// Creates a [`MetadataError::Lookup`].
    pub fn lookup(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Lookup {
            kind,
            name: name.into(),
        }
    }

    /// Creates a [`MetadataError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
