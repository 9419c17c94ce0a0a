//! Error types for the directory layer.
//!
//! Per-lookup failures do not appear here: they travel inside a
//! [`LookupCompletion`](crate::LookupCompletion) so that every lookup ends in
//! exactly one completion. These errors cover building a client and
//! checking a payload.

/// Errors raised while constructing a directory client.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The server address is empty or carries a URL scheme.
    ///
    /// The address is a bare host (optionally `host:port`); the client adds
    /// `http://` and the API path itself.
    #[error("invalid directory server address: {0:?}")]
    InvalidServer(String),

    /// The license key cannot be sent as an HTTP header value.
    #[error("license key is empty or contains characters not allowed in a header")]
    InvalidCredential,

    /// The underlying HTTP client could not be built.
    #[error("http client setup failed: {0}")]
    Client(#[source] reqwest::Error),
}

/// Errors raised while decoding a directory payload.
///
/// Both variants surface to the caller as a protocol failure. A malformed
/// payload must never look like "no match".
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The body is not JSON, or required fields are missing or mistyped.
    #[error("malformed directory payload: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The body parsed but `results` disagrees with `count`.
    #[error("directory payload reports count {count} but carries {results} results")]
    Inconsistent { count: u64, results: usize },
}
