// Login / logout
//
// Login is the only call that goes out without a session cookie. The
// platform answers with a `Set-Cookie: unetlab_session=...` header; that
// value becomes the token every later request carries.

use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::envelope::Envelope;
use crate::error::Error;
use crate::session::{SESSION_COOKIE, Session};

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    html5: u8,
}

impl Session {
    /// Authenticate with username/password and store the session token.
    ///
    /// Anything other than HTTP 200 with a `unetlab_session` cookie is an
    /// [`Error::Authentication`].
    pub async fn login(&self) -> Result<(), Error> {
        let url = self.url("api/auth/login")?;
        debug!(%url, username = self.username(), "logging in");

        let body = LoginRequest {
            username: self.username(),
            password: self.password().expose_secret(),
            html5: 1,
        };

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let token = resp
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.value().to_owned());
        let text = resp.text().await.map_err(Error::Transport)?;

        if status != reqwest::StatusCode::OK {
            let message = match serde_json::from_str::<Envelope>(&text) {
                Ok(env) if !env.message.is_empty() => match env.code {
                    Some(code) => format!("login failed: {} (code: {code})", env.message),
                    None => format!("login failed: {}", env.message),
                },
                _ => format!("login failed: status {}, body: {}", status.as_u16(), text.trim()),
            };
            return Err(Error::Authentication { message });
        }

        match token {
            Some(token) if !token.is_empty() => {
                self.set_token(token);
                info!(username = self.username(), "session established");
                Ok(())
            }
            _ => Err(Error::Authentication {
                message: format!("login succeeded but no {SESSION_COOKIE} cookie was returned"),
            }),
        }
    }

    /// End the session. Best-effort: the local token is cleared whatever
    /// the platform answers, and a missing token makes this a no-op.
    pub async fn logout(&self) -> Result<(), Error> {
        if !self.is_authenticated() {
            return Ok(());
        }

        match self.get("api/auth/logout").await {
            Ok(resp) => {
                // Drain so the connection can be reused.
                let _ = resp.bytes().await;
                debug!("logged out");
            }
            Err(e) => warn!(error = %e, "logout request failed; dropping session anyway"),
        }

        self.clear_token();
        Ok(())
    }
}
