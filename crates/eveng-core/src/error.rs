// ── Core error types ──
//
// Errors surfaced to whoever drives the reconcilers. API-layer failures
// are translated by `From<eveng_api::Error>`; the variants added here
// carry the operation and resource kind so a diagnostic reads on its own.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Setup errors ─────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("No active session: log in before reconciling")]
    NoSession,

    // ── Transport / platform errors ──────────────────────────────────
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },

    #[error("Unexpected response: {message}")]
    Decode { message: String },

    // ── Reconciliation errors ────────────────────────────────────────
    /// A stored identifier does not have the shape the kind expects.
    #[error("Invalid {expected} identifier: '{id}'")]
    Identity { id: String, expected: &'static str },

    #[error("Failed to {operation} {kind}: {message}")]
    Operation {
        operation: &'static str,
        kind: &'static str,
        message: String,
    },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid value for '{field}': {reason}")]
    Validation { field: &'static str, reason: String },
}

impl CoreError {
    /// Wrap an error with the operation and kind it happened in.
    ///
    /// Setup and identity errors pass through unchanged; everything else
    /// becomes [`CoreError::Operation`] with the remote message preserved.
    pub fn during(self, operation: &'static str, kind: &'static str) -> Self {
        match self {
            Self::Configuration { .. }
            | Self::Authentication { .. }
            | Self::NoSession
            | Self::Identity { .. }
            | Self::Validation { .. }
            | Self::Operation { .. } => self,
            other => Self::Operation {
                operation,
                kind,
                message: other.to_string(),
            },
        }
    }

    /// Whether the platform reported the addressed object as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Api { code: 404, .. })
    }
}

// ── Conversion from API-layer errors ─────────────────────────────────

impl From<eveng_api::Error> for CoreError {
    fn from(err: eveng_api::Error) -> Self {
        use eveng_api::Error as E;
        match err {
            E::Configuration { message } => Self::Configuration { message },
            E::InvalidUrl(e) => Self::Configuration {
                message: format!("invalid endpoint: {e}"),
            },
            E::Tls(message) => Self::Configuration { message },
            E::Authentication { message } => Self::Authentication { message },
            E::NoSession => Self::NoSession,
            E::Transport(e) => match e.status() {
                Some(status) if status.as_u16() == 404 => Self::Api {
                    code: 404,
                    message: e.to_string(),
                },
                _ => Self::Transport {
                    message: e.to_string(),
                },
            },
            E::Api { code, message } => Self::Api { code, message },
            E::Decode { message, .. } => Self::Decode { message },
            E::Encode(e) => Self::Decode {
                message: format!("failed to encode request: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_translate() {
        let err: CoreError = eveng_api::Error::Api {
            code: 412,
            message: "Lab is locked".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { code: 412, .. }));
    }

    #[test]
    fn during_wraps_remote_failures() {
        let err = CoreError::Api {
            code: 400,
            message: "Invalid name".into(),
        }
        .during("create", "network");
        assert_eq!(
            err.to_string(),
            "Failed to create network: API error 400: Invalid name"
        );
    }

    #[test]
    fn during_keeps_identity_errors() {
        let err = CoreError::Identity {
            id: "bogus".into(),
            expected: "network",
        }
        .during("update", "network");
        assert!(matches!(err, CoreError::Identity { .. }));
    }

    #[test]
    fn not_found_detection() {
        assert!(
            CoreError::Api {
                code: 404,
                message: String::new()
            }
            .is_not_found()
        );
        assert!(
            CoreError::NotFound {
                kind: "lab",
                id: "/x.unl".into()
            }
            .is_not_found()
        );
    }
}
