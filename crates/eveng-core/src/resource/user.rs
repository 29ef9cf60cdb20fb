// ── User ──
//
// Keyed by username. The platform never returns the password, so reads
// carry it over from the prior record.

use std::fmt;

use eveng_api::Session;
use eveng_api::models::{User as WireUser, UserPayload};
use secrecy::{ExposeSecret, SecretString};

use crate::error::CoreError;
use crate::reconcile::{Observed, Record, Resource, changed, differs};

use super::required;

/// A user password. Compares by value, never prints it.
#[derive(Clone)]
pub struct Password(SecretString);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserSpec {
    pub username: Option<String>,
    pub password: Option<Password>,
    pub email: Option<String>,
    pub name: Option<String>,
    /// `admin` or `user`.
    pub role: Option<String>,
    pub enabled: Option<bool>,
    /// Expiry as the platform renders it; `-1` never expires.
    pub expires: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    pub username: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct User;

fn observed(username: &str, user: WireUser, prior: &UserSpec) -> Observed<User> {
    let spec = UserSpec {
        username: Some(if user.username.is_empty() {
            username.to_owned()
        } else {
            user.username
        }),
        password: prior.password.clone(),
        email: Some(user.email),
        name: Some(user.name),
        role: Some(user.role),
        enabled: Some(user.enabled),
        expires: Some(user.expires),
    };
    let state = UserState {
        username: username.to_owned(),
    };
    (spec, state)
}

impl Resource for User {
    const KIND: &'static str = "user";
    type Spec = UserSpec;
    type State = UserState;
    type Key = String;

    fn parse_id(id: &str) -> Option<String> {
        (!id.is_empty() && !id.contains(['/', ':'])).then(|| id.to_owned())
    }

    fn format_id(key: &String) -> String {
        key.clone()
    }

    async fn create(session: &Session, spec: &UserSpec) -> Result<(String, UserState), CoreError> {
        let username = required(&spec.username, "username")?;
        let password = required(&spec.password, "password")?;
        let payload = UserPayload {
            username: Some(username.clone()),
            password: Some(password.expose().to_owned()),
            email: spec.email.clone(),
            name: spec.name.clone(),
            role: spec.role.clone(),
            enabled: spec.enabled,
            expires: spec.expires.clone(),
        };
        session.create_user(&payload).await?;
        Ok((username.clone(), UserState::default()))
    }

    async fn read(
        session: &Session,
        username: &String,
        prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        let user = session.get_user(username).await?;
        Ok(observed(username, user, &prior.spec))
    }

    async fn read_from_list(
        session: &Session,
        username: &String,
        prior: &Record<Self>,
    ) -> Result<Option<Observed<Self>>, CoreError> {
        let users = session.list_users().await?;
        let found = users
            .get(username)
            .or_else(|| users.values().find(|u| u.username == *username))
            .cloned();
        Ok(found.map(|u| observed(username, u, &prior.spec)))
    }

    async fn update(
        session: &Session,
        username: &String,
        prior: &UserSpec,
        desired: &UserSpec,
    ) -> Result<String, CoreError> {
        let payload = UserPayload {
            username: None,
            password: changed(&prior.password, &desired.password)
                .map(|p| p.expose().to_owned()),
            email: changed(&prior.email, &desired.email),
            name: changed(&prior.name, &desired.name),
            role: changed(&prior.role, &desired.role),
            enabled: changed(&prior.enabled, &desired.enabled),
            expires: changed(&prior.expires, &desired.expires),
        };
        session.update_user(username, &payload).await?;
        Ok(username.clone())
    }

    async fn delete(session: &Session, username: &String, _spec: &UserSpec) -> Result<(), CoreError> {
        session.delete_user(username).await?;
        Ok(())
    }

    fn requires_replacement(prior: &UserSpec, desired: &UserSpec) -> bool {
        differs(&prior.username, &desired.username)
    }

    fn has_changes(prior: &UserSpec, desired: &UserSpec) -> bool {
        differs(&prior.password, &desired.password)
            || differs(&prior.email, &desired.email)
            || differs(&prior.name, &desired.name)
            || differs(&prior.role, &desired.role)
            || differs(&prior.enabled, &desired.enabled)
            || differs(&prior.expires, &desired.expires)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_debug_is_redacted() {
        let spec = UserSpec {
            password: Some("hunter2".into()),
            ..UserSpec::default()
        };
        let rendered = format!("{spec:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn password_change_is_an_update() {
        let prior = UserSpec {
            username: Some("alice".into()),
            password: Some("old".into()),
            ..UserSpec::default()
        };
        let desired = UserSpec {
            password: Some("new".into()),
            ..prior.clone()
        };
        assert!(User::has_changes(&prior, &desired));
        assert!(!User::requires_replacement(&prior, &desired));
        assert!(!User::has_changes(&prior, &prior.clone()));
    }

    #[test]
    fn usernames_are_plain_keys() {
        assert_eq!(User::parse_id("alice").as_deref(), Some("alice"));
        assert!(User::parse_id("/demo.unl").is_none());
        assert!(User::parse_id("").is_none());
    }
}
