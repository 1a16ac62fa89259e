use thiserror::Error;

/// Top-level error type for the `fwconverge-api` crate.
///
/// Covers transport, authentication and GraphQL envelope failures.
/// Structured mutation failures (a `FAILURE` status with an error-code
/// list) are *not* errors at this layer: they come back inside the
/// mutation payload so the caller can report every entry.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The endpoint rejected the request as unauthenticated.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The API key was rejected (HTTP 401/403).
    #[error("Invalid API key")]
    InvalidApiKey,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success HTTP status that carried no GraphQL envelope.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── GraphQL ─────────────────────────────────────────────────────
    /// The GraphQL envelope carried top-level `errors`.
    #[error("GraphQL error: {}", messages.join("; "))]
    GraphQl { messages: Vec<String> },

    /// The response was well-formed but the expected data path was null.
    #[error("Response contained no data at `{path}`")]
    MissingData { path: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the failure happened before or during the HTTP
    /// exchange (as opposed to a well-formed response the API rejected).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout { .. } | Self::Tls(_) | Self::InvalidUrl(_)
        )
    }

    /// Returns `true` if this error indicates the credentials are wrong.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::InvalidApiKey)
    }

    /// Returns `true` if this is a transient error a caller might retry.
    ///
    /// The reconciliation engine never retries on its own; this is for
    /// outer drivers that want to.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Messages as discrete entries, one per GraphQL error when available.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::GraphQl { messages } => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}
