// User endpoints

use tracing::debug;

use crate::envelope;
use crate::error::Error;
use crate::models::{User, UserPayload};
use crate::session::Session;
use crate::variant::Keyed;

impl Session {
    /// All users, keyed by username.
    ///
    /// `GET api/users`
    pub async fn list_users(&self) -> Result<Keyed<User>, Error> {
        let resp = self.get("api/users").await?;
        envelope::data(resp, 200).await
    }

    /// `GET api/users/<username>`
    pub async fn get_user(&self, username: &str) -> Result<User, Error> {
        let resp = self.get(&format!("api/users/{username}")).await?;
        envelope::data(resp, 200).await
    }

    /// `POST api/users`
    pub async fn create_user(&self, user: &UserPayload) -> Result<(), Error> {
        debug!(username = ?user.username, "creating user");
        let resp = self.post("api/users", Some(user)).await?;
        envelope::check(resp).await
    }

    /// `PUT api/users/<username>` with only the changed fields.
    pub async fn update_user(&self, username: &str, user: &UserPayload) -> Result<(), Error> {
        debug!(username, "updating user");
        let resp = self.put(&format!("api/users/{username}"), Some(user)).await?;
        envelope::check(resp).await
    }

    /// `DELETE api/users/<username>`
    pub async fn delete_user(&self, username: &str) -> Result<(), Error> {
        debug!(username, "deleting user");
        let resp = self.delete(&format!("api/users/{username}")).await?;
        envelope::check(resp).await
    }
}
