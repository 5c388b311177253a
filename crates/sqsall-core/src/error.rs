//! Error taxonomy shared by the resolver, codec, drainer and filler.

/// Boxed source for failures raised by the underlying SQS client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Contradictory or incomplete queue selection.
    #[error("{0}")]
    Configuration(String),

    /// The named queue could not be resolved to a URL.
    #[error("queue `{name}` does not exist")]
    NotFound {
        name: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A FIFO input line without the group id separator.
    #[error("line `{line}` has no {separator:?} and this is a fifo queue")]
    MalformedLine { line: String, separator: char },

    /// Some messages were emitted but could not be deleted.
    #[error("failed to delete {} message(s) after printing them: {}", .failed.len(), .failed.join(", "))]
    Acknowledgment {
        failed: Vec<String>,
        #[source]
        source: Option<BoxError>,
    },

    /// The service answered with something we cannot use.
    #[error("unexpected response from SQS: {0}")]
    InvalidResponse(String),

    #[error("SQS {operation} failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn transport(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            operation,
            source: source.into(),
        }
    }
}
