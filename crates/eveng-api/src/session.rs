// Session-authenticated HTTP transport
//
// Owns the base URL, credentials, and the `unetlab_session` token. Every
// verb helper attaches the token as a cookie and hands the raw response
// back; decoding is the envelope module's job. Endpoint families (labs,
// networks, nodes, ...) are inherent methods implemented in sibling files.

use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Method, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{TlsMode, TransportConfig};

/// Name of the cookie the platform issues on login.
pub const SESSION_COOKIE: &str = "unetlab_session";

/// Everything needed to open a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Platform root, e.g. `https://eve.lab.local/`.
    pub endpoint: Url,
    pub username: String,
    pub password: SecretString,
    pub insecure_skip_verify: bool,
    pub timeout: Duration,
}

impl SessionConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from_insecure(self.insecure_skip_verify),
            timeout: self.timeout,
        }
    }
}

/// Authenticated connection to one EVE-NG server.
///
/// The token is written by [`login`](Self::login) and cleared by
/// [`logout`](Self::logout); between the two it is only read, so a
/// `Session` can be shared (`Arc<Session>`) across concurrent handlers.
pub struct Session {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
    token: RwLock<Option<SecretString>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build an unauthenticated session from a config.
    ///
    /// The endpoint must be an absolute `http`/`https` URL; anything else is
    /// a configuration error. No network I/O happens here.
    pub fn new(config: &SessionConfig) -> Result<Self, Error> {
        let base_url = normalize_base_url(config.endpoint.clone())?;
        let http = config.transport().build_client()?;
        Ok(Self::with_client(
            http,
            base_url,
            config.username.clone(),
            config.password.clone(),
        ))
    }

    /// Build a session and log in. A login failure aborts construction.
    pub async fn connect(config: &SessionConfig) -> Result<Self, Error> {
        let session = Self::new(config)?;
        session.login().await?;
        Ok(session)
    }

    /// Create a session around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: String,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url: ensure_trailing_slash(base_url),
            username,
            password,
            token: RwLock::new(None),
        }
    }

    /// The platform root every API path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Whether a non-empty session token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }

    // ── Token management ─────────────────────────────────────────────

    pub(crate) fn set_token(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) =
            Some(SecretString::from(token));
    }

    pub(crate) fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The `Cookie` header value for the current session.
    pub(crate) fn cookie_header(&self) -> Result<String, Error> {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref().map(ExposeSecret::expose_secret) {
            Some(token) if !token.is_empty() => Ok(format!("{SESSION_COOKIE}={token}")),
            _ => Err(Error::NoSession),
        }
    }

    // ── URL builder ─────────────────────────────────────────────────

    /// Resolve an API path (e.g. `api/labs/demo.unl`) against the base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Verb helpers ─────────────────────────────────────────────────

    /// `GET {base}{path}` with the session cookie.
    pub async fn get(&self, path: &str) -> Result<Response, Error> {
        self.send(Method::GET, path, None).await
    }

    /// `POST {base}{path}`; `None` sends no body.
    pub async fn post<B>(&self, path: &str, body: Option<&B>) -> Result<Response, Error>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(serde_json::to_vec).transpose()?;
        self.send(Method::POST, path, body).await
    }

    /// `PUT {base}{path}`; `None` sends no body.
    pub async fn put<B>(&self, path: &str, body: Option<&B>) -> Result<Response, Error>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(serde_json::to_vec).transpose()?;
        self.send(Method::PUT, path, body).await
    }

    /// `DELETE {base}{path}` with the session cookie.
    pub async fn delete(&self, path: &str) -> Result<Response, Error> {
        self.send(Method::DELETE, path, None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response, Error> {
        let cookie = self.cookie_header()?;
        let url = self.url(path)?;
        debug!(%method, %url, "sending request");

        let mut builder = self.http.request(method, url).header(COOKIE, cookie);
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        builder.send().await.map_err(Error::Transport)
    }
}

/// Validate an endpoint and make sure relative API paths land beneath it.
fn normalize_base_url(url: Url) -> Result<Url, Error> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Configuration {
            message: format!("endpoint must use http or https, got '{}'", url.scheme()),
        });
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::Configuration {
            message: format!("endpoint has no host: {url}"),
        });
    }
    Ok(ensure_trailing_slash(url))
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session(endpoint: &str) -> Session {
        Session::with_client(
            reqwest::Client::new(),
            Url::parse(endpoint).unwrap(),
            "admin".into(),
            SecretString::from("eve".to_string()),
        )
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let s = session("https://eve.example.com/proxy");
        assert_eq!(s.base_url().as_str(), "https://eve.example.com/proxy/");
    }

    #[test]
    fn api_paths_join_under_base() {
        let s = session("https://eve.example.com/proxy");
        let url = s.url("api/labs/demo.unl").unwrap();
        assert_eq!(url.as_str(), "https://eve.example.com/proxy/api/labs/demo.unl");
    }

    #[test]
    fn leading_slash_does_not_escape_base() {
        let s = session("https://eve.example.com/proxy/");
        let url = s.url("/api/status").unwrap();
        assert_eq!(url.as_str(), "https://eve.example.com/proxy/api/status");
    }

    #[test]
    fn cookie_header_requires_token() {
        let s = session("https://eve.example.com");
        assert!(matches!(s.cookie_header(), Err(Error::NoSession)));
        assert!(!s.is_authenticated());

        s.set_token("abc".into());
        assert_eq!(s.cookie_header().unwrap(), "unetlab_session=abc");
        assert!(s.is_authenticated());

        s.clear_token();
        assert!(matches!(s.cookie_header(), Err(Error::NoSession)));
    }

    #[test]
    fn empty_token_counts_as_no_session() {
        let s = session("https://eve.example.com");
        s.set_token(String::new());
        assert!(matches!(s.cookie_header(), Err(Error::NoSession)));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let s = session("https://eve.example.com");
        s.set_token("very-secret-token".into());
        let rendered = format!("{s:?}");
        assert!(!rendered.contains("very-secret-token"));
        assert!(rendered.contains("authenticated: true"));
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        let config = SessionConfig {
            endpoint: Url::parse("ftp://eve.example.com").unwrap(),
            username: "admin".into(),
            password: SecretString::from("eve".to_string()),
            insecure_skip_verify: false,
            timeout: Duration::from_secs(5),
        };
        assert!(matches!(
            Session::new(&config),
            Err(Error::Configuration { .. })
        ));
    }
}
