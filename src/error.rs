use thiserror::Error;

use crate::errno::ErrorKind;

/// Errors surfaced by the XenStore client core.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum XsError {
    /// I/O failure while reading from or writing to the transport.
    #[error("transport error")]
    Transport {
        /// The causing error.
        #[from]
        source: std::io::Error,
    },

    /// The server replied with an `ERROR` message; `kind` is the mapped mnemonic.
    #[error("server responded with error: {kind:?}")]
    ServerError {
        /// The mapped error kind.
        kind: ErrorKind,
    },

    /// A scanf-style parse found no conversions, or a printf-style format would
    /// overflow the wire buffer.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Reserved for API fidelity with the source protocol's error space; produced
    /// only by the façade's explicit buffer-size guard, never by fallible allocation.
    #[error("out of memory")]
    OutOfMemory,

    /// The decoded wire frame violated the framing contract (e.g. a `WATCH_EVENT`
    /// payload with fewer than two NUL-terminated strings).
    #[error("protocol framing violation: {0}")]
    Framing(&'static str),

    /// A mutex or rwlock guarding shared state was poisoned by a panicking holder.
    #[error("lock poisoned")]
    Poison,

    /// The client was shut down; the operation was cancelled instead of blocking
    /// forever.
    #[error("client shut down")]
    Cancelled,

    /// Caller-side misuse that does not correspond to a wire-level failure.
    #[error("usage error: {0}")]
    Usage(&'static str),
}

/// Abbreviation of `Result<T, XsError>`.
pub type XsResult<T> = std::result::Result<T, XsError>;

impl<G> From<std::sync::PoisonError<G>> for XsError {
    fn from(_error: std::sync::PoisonError<G>) -> Self {
        Self::Poison
    }
}

impl XsError {
    pub(crate) fn server_error(&self) -> Option<ErrorKind> {
        match self {
            Self::ServerError { kind } => Some(*kind),
            _ => None,
        }
    }
}
