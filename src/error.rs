//! Error handling for the client core.
//!
//! A single concrete error type covers every failure the pipeline, the
//! policies, and the XML codec can surface. Nothing here swallows errors: a
//! stage either fully handles one (the retry stage resubmitting a request)
//! or re-raises it unchanged to its caller.

/// Errors surfaced by the pipeline, its policies, and the XML codec.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The operation's context was cancelled or its deadline passed.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// Connection-level failure. Always eligible for retry inspection.
    #[error("transport error: {0}")]
    Transport(String),

    /// The credential provider failed to produce a token. Surfaced to the
    /// caller without retry.
    #[error("credential error: {0}")]
    Credential(String),

    /// Malformed XML on the wire, while parsing or emitting. Never retried,
    /// always fatal to the current call.
    #[error("malformed protocol data: {0}")]
    MalformedProtocolData(String),

    /// A non-success status the protocol layer turned into an error. The
    /// status and the (already read) body text are preserved.
    #[error("service returned status {status}: {message}")]
    Service { status: u16, message: String },

    /// Invalid client-side configuration, e.g. a header value that cannot
    /// be represented on the wire.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An invariant inside the crate was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Whether the retry stage may resubmit the request after this error.
    ///
    /// Transport failures are always candidates. Service errors are
    /// transient only for timeout, throttling, and server-side statuses.
    /// Cancellation, credential, and protocol-data failures never are.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Service { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            _ => false,
        }
    }
}
