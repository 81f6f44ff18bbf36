//! Error types for trellis-client.

use thiserror::Error;

/// All errors a remote call can produce.
///
/// Remote messages are carried verbatim; the engine aborts on the first one
/// and the CLI prints it as-is, so nothing is lost to rewording.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure before any HTTP status was received
    /// (DNS, TLS, connect timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx HTTP response from the endpoint.
    #[error("remote returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response was HTTP 200 but carried GraphQL-level errors.
    #[error("remote error: {0}")]
    Remote(String),

    /// Response body was not the JSON shape we expect.
    #[error("failed to decode response: {0}")]
    Decode(#[from] std::io::Error),
}
