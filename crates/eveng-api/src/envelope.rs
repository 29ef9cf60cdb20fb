// Response envelope normalization
//
// Every platform reply is `{code, status, message, data}`. This module is
// the single place where an HTTP response becomes either a typed value or
// an `Error`, so the envelope never leaks past the API layer.

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::trace;

use crate::error::Error;
use crate::variant::de;

/// The platform's uniform reply wrapper.
///
/// `code` is the platform's own status (200, 201, 400, 404, 412...) and is
/// independent of the HTTP status: a 200 reply may still carry `code: 404`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T = IgnoredAny> {
    #[serde(default, deserialize_with = "opt_code")]
    pub code: Option<u16>,
    #[serde(default, deserialize_with = "de::text_like")]
    pub status: String,
    #[serde(default, deserialize_with = "de::text_like")]
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Fail when the envelope carries a code other than `expected`. A
    /// missing code is accepted.
    pub fn expect(self, expected: u16) -> Result<Self, Error> {
        match self.code {
            Some(code) if code != expected => Err(rejection(code, &self.status, self.describe())),
            _ => Ok(self),
        }
    }

    /// Fail when the envelope carries a code outside 2xx. For calls whose
    /// success code varies between platform releases.
    pub fn ensure_success(self) -> Result<Self, Error> {
        match self.code {
            Some(code) if !(200..300).contains(&code) => {
                Err(rejection(code, &self.status, self.describe()))
            }
            _ => Ok(self),
        }
    }

    /// The `data` payload, or a decode error if the platform sent none.
    pub fn into_data(self) -> Result<T, Error> {
        let message = self.describe();
        self.data.ok_or_else(|| Error::Decode {
            message: "response carried no data".into(),
            body: message,
        })
    }

    fn describe(&self) -> String {
        if !self.message.is_empty() {
            self.message.clone()
        } else if !self.status.is_empty() {
            self.status.clone()
        } else {
            "unexpected response code".into()
        }
    }
}

fn opt_code<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<u16>, D::Error> {
    Ok(de::opt_int_like(d)
        .ok()
        .flatten()
        .and_then(|c| u16::try_from(c).ok()))
}

/// Error-path view of a body: only the fields worth reporting.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default, deserialize_with = "opt_code")]
    code: Option<u16>,
    #[serde(default, deserialize_with = "de::text_like")]
    status: String,
    #[serde(default, deserialize_with = "de::opt_text_like")]
    message: Option<String>,
}

/// Whether a rejection means the session cookie is no longer accepted.
/// The platform answers an expired session with 412 and status
/// `unauthorized`; a plain 401 means the same.
fn is_unauthorized(code: u16, status: &str) -> bool {
    code == 401 || (code == 412 && status.eq_ignore_ascii_case("unauthorized"))
}

/// Build the error for a rejected call.
fn rejection(code: u16, status: &str, message: String) -> Error {
    if is_unauthorized(code, status) {
        Error::Authentication {
            message: format!("session rejected ({code}): {message}"),
        }
    } else {
        Error::Api { code, message }
    }
}

// ── Normalizers ─────────────────────────────────────────────────────

/// Read the body and decode it into `T`.
///
/// HTTP >= 400 yields [`Error::Api`] built from the envelope when the body
/// decodes as one, otherwise from the HTTP status and raw body text. A
/// success status whose body does not decode yields [`Error::Decode`].
/// The body is always drained.
pub async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let (status, body) = drain(resp).await?;
    if let Some(err) = failure(status, &body) {
        return Err(err);
    }
    serde_json::from_str(&body).map_err(|e| Error::Decode {
        message: e.to_string(),
        body,
    })
}

/// Read the body and require success without a specific code.
///
/// For calls whose success code varies between platform releases. The
/// HTTP status must be a success, and when the body is an envelope its
/// `code` must be 2xx too. A body that is not an envelope counts as
/// success.
pub async fn check(resp: Response) -> Result<(), Error> {
    let (status, body) = drain(resp).await?;
    if let Some(err) = failure(status, &body) {
        return Err(err);
    }
    match serde_json::from_str::<Envelope>(&body) {
        Ok(env) => env.ensure_success().map(drop),
        Err(_) => Ok(()),
    }
}

/// Decode an envelope and require a specific `code`.
pub async fn expect_code<T: DeserializeOwned>(
    resp: Response,
    expected: u16,
) -> Result<Envelope<T>, Error> {
    decode::<Envelope<T>>(resp).await?.expect(expected)
}

/// Decode an envelope, require `code`, and return its `data`.
pub async fn data<T: DeserializeOwned>(resp: Response, expected: u16) -> Result<T, Error> {
    expect_code::<T>(resp, expected).await?.into_data()
}

async fn drain(resp: Response) -> Result<(StatusCode, String), Error> {
    let status = resp.status();
    let url = resp.url().clone();
    let body = resp.text().await.map_err(Error::Transport)?;
    trace!(%status, %url, bytes = body.len(), "response received");
    Ok((status, body))
}

fn failure(status: StatusCode, body: &str) -> Option<Error> {
    if status.as_u16() < 400 {
        return None;
    }
    let parsed = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .filter(|e| e.code.is_some() || e.message.is_some());
    Some(match parsed {
        Some(e) => rejection(
            e.code.unwrap_or(status.as_u16()),
            &e.status,
            e.message.unwrap_or_default(),
        ),
        None if status == StatusCode::UNAUTHORIZED => Error::Authentication {
            message: format!("session rejected ({status})"),
        },
        None => Error::Api {
            code: status.as_u16(),
            message: if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_owned()
            } else {
                body.trim().to_owned()
            },
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_prefers_envelope_message() {
        let body = json!({"code": 404, "status": "fail", "message": "Lab does not exist"});
        let err = failure(StatusCode::NOT_FOUND, &body.to_string()).unwrap();
        match err {
            Error::Api { code, message } => {
                assert_eq!(code, 404);
                assert_eq!(message, "Lab does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn failure_falls_back_to_raw_body() {
        let err = failure(StatusCode::BAD_GATEWAY, "<html>oops</html>").unwrap();
        match err {
            Error::Api { code, message } => {
                assert_eq!(code, 502);
                assert_eq!(message, "<html>oops</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn failure_ignores_success_statuses() {
        assert!(failure(StatusCode::OK, "not json").is_none());
        assert!(failure(StatusCode::CREATED, "").is_none());
    }

    #[test]
    fn expect_rejects_mismatched_code() {
        let env: Envelope =
            serde_json::from_value(json!({"code": 404, "status": "fail", "message": "gone"}))
                .unwrap();
        let err = env.expect(200).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn expect_accepts_missing_code() {
        let env: Envelope = serde_json::from_value(json!({"status": "success"})).unwrap();
        assert!(env.expect(201).is_ok());
    }

    #[test]
    fn expired_session_is_authentication_error() {
        let body = json!({
            "code": 412, "status": "unauthorized",
            "message": "User is not authenticated or session timed out (90001)."
        });
        let err = failure(StatusCode::PRECONDITION_FAILED, &body.to_string()).unwrap();
        assert!(matches!(err, Error::Authentication { .. }), "got: {err:?}");

        let env: Envelope = serde_json::from_value(body).unwrap();
        assert!(matches!(env.expect(200), Err(Error::Authentication { .. })));
    }

    #[test]
    fn other_412_stays_api_error() {
        let body = json!({"code": 412, "status": "fail", "message": "Lab is locked"});
        let err = failure(StatusCode::PRECONDITION_FAILED, &body.to_string()).unwrap();
        assert_eq!(err.api_code(), Some(412));
    }

    #[test]
    fn ensure_success_accepts_any_2xx_code() {
        let created: Envelope = serde_json::from_value(json!({"code": 201})).unwrap();
        assert!(created.ensure_success().is_ok());

        let bare: Envelope = serde_json::from_value(json!({})).unwrap();
        assert!(bare.ensure_success().is_ok());

        let locked: Envelope =
            serde_json::from_value(json!({"code": 400, "message": "Lab is locked"})).unwrap();
        assert_eq!(locked.ensure_success().unwrap_err().api_code(), Some(400));
    }

    #[test]
    fn bare_401_is_authentication_error() {
        let err = failure(StatusCode::UNAUTHORIZED, "").unwrap();
        assert!(matches!(err, Error::Authentication { .. }));
    }

    #[test]
    fn envelope_code_may_be_string() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"code": "201", "data": {"id": 1}})).unwrap();
        assert_eq!(env.code, Some(201));
        assert_eq!(env.into_data().unwrap(), json!({"id": 1}));
    }

    #[test]
    fn missing_data_is_decode_error() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"code": 200})).unwrap();
        assert!(matches!(env.into_data(), Err(Error::Decode { .. })));
    }
}
