use thiserror::Error;

use crate::address::AddressError;
use crate::document::BufferError;
use crate::fetch::FetchError;
use crate::handlers::HandlerError;

/// Failure categories surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed directive line or address expression
    Syntax,
    /// Address feature that is recognised but not implemented
    UnsupportedFeature,
    /// Address pattern or line number selected nothing
    NoMatch,
    /// Local target missing or unreadable
    NotFound,
    /// Network, transport or HTTP status failure
    Fetch,
    /// Write outside the document bounds
    OutOfRange,
    Cancelled,
    /// A resolution task crashed or a handler failed in its own way
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{source_name}:{line}: {source}")]
    Directive {
        source_name: String,
        line: usize,
        #[source]
        source: HandlerError,
    },

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("context cancelled")]
    Cancelled,

    #[error("resolution task failed: {0}")]
    TaskFailed(String),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Directive { source, .. } => handler_kind(source),
            DispatchError::Buffer(BufferError::OutOfRange { .. }) => ErrorKind::OutOfRange,
            DispatchError::Cancelled => ErrorKind::Cancelled,
            DispatchError::TaskFailed(_) => ErrorKind::Internal,
        }
    }
}

fn handler_kind(err: &HandlerError) -> ErrorKind {
    match err {
        HandlerError::Syntax(_) => ErrorKind::Syntax,
        HandlerError::Address(address) => match address {
            AddressError::Syntax(_) | AddressError::Pattern { .. } => ErrorKind::Syntax,
            AddressError::Unsupported(_) => ErrorKind::UnsupportedFeature,
            AddressError::NoMatch(_) | AddressError::OutOfRange => ErrorKind::NoMatch,
        },
        HandlerError::Fetch(FetchError::NotFound { .. }) => ErrorKind::NotFound,
        HandlerError::Fetch(_) => ErrorKind::Fetch,
        HandlerError::Failed(_) => ErrorKind::Internal,
    }
}
