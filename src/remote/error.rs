use thiserror::Error;

/// Errors from the frame transformation round trip.
///
/// A failed transform degrades quality by one dropped frame; it is never
/// fatal to the pipeline session. No retries — the next tick is the retry.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("transform request failed: {cause}")]
    RequestFailed { cause: String },

    #[error("invalid service url: {0}")]
    InvalidUrl(String),
}

/// Errors from the control surface of the remote service.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The request could not be sent or the response not read.
    #[error("control request failed: {0}")]
    RequestFailed(String),

    /// The server answered non-2xx; carries the server's error string
    /// when the body was parseable.
    #[error("control command rejected: {0}")]
    Rejected(String),

    #[error("invalid service url: {0}")]
    InvalidUrl(String),
}
