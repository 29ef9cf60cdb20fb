// Transport configuration for building the session's reqwest::Client.
//
// TLS mode and the single per-request timeout live here so the session
// module only deals with URLs, cookies, and verbs.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("eveng-connector/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Accept any certificate (lab servers are commonly self-signed).
    DangerAcceptInvalid,
}

impl TlsMode {
    pub fn from_insecure(insecure_skip_verify: bool) -> Self {
        if insecure_skip_verify {
            Self::DangerAcceptInvalid
        } else {
            Self::System
        }
    }
}

/// HTTP client settings shared by every call a session makes.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Applies uniformly to every request; there is no per-call override.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// No cookie store is installed: the session cookie is attached
    /// explicitly on every request so that logout can drop it.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        if self.tls == TlsMode::DangerAcceptInvalid {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
