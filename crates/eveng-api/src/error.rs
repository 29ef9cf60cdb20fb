use thiserror::Error;

/// Top-level error type for the `eveng-api` crate.
///
/// Mirrors the connector's failure taxonomy: setup problems, login problems,
/// network failures, business rejections reported by the platform, and
/// success responses that do not match the expected shape.
/// `eveng-core` maps these into handler diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Setup ───────────────────────────────────────────────────────
    /// Invalid endpoint or other construction-time misconfiguration.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the session cookie was missing from the reply.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// An authenticated call was attempted before `login()` succeeded
    /// (or after `logout()`). This is a caller bug, not a platform error.
    #[error("No active session -- login() must succeed before issuing API calls")]
    NoSession,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // ── Platform ────────────────────────────────────────────────────
    /// The platform rejected the call: HTTP >= 400, or an envelope whose
    /// `code` is not the expected success value.
    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// A success response whose body did not match the expected shape.
    #[error("Decode error: {message}")]
    Decode { message: String, body: String },

    /// A request payload could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if the platform reported the addressed object as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Api { code: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Returns `true` if this is a network-level failure that a later
    /// reconciliation pass might not hit again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// The envelope or HTTP code, if the platform produced one.
    pub fn api_code(&self) -> Option<u16> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
