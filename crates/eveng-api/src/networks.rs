// Lab network endpoints

use serde::de::IgnoredAny;
use tracing::debug;

use crate::envelope;
use crate::error::Error;
use crate::labs::lab_path;
use crate::models::{CreatedId, Network, NetworkPayload};
use crate::session::Session;
use crate::variant::Keyed;

impl Session {
    /// All networks of a lab, keyed by network id.
    ///
    /// `GET api/labs<file>/networks`
    pub async fn list_networks(&self, file: &str) -> Result<Keyed<Network>, Error> {
        let resp = self.get(&lab_path(file, "/networks")).await?;
        envelope::data(resp, 200).await
    }

    /// `GET api/labs<file>/networks/<id>`
    pub async fn get_network(&self, file: &str, id: u32) -> Result<Network, Error> {
        let resp = self.get(&lab_path(file, &format!("/networks/{id}"))).await?;
        envelope::data(resp, 200).await
    }

    /// Create a network and return its server-assigned id.
    ///
    /// `POST api/labs<file>/networks`; success is envelope code 201.
    pub async fn create_network(&self, file: &str, network: &NetworkPayload) -> Result<u32, Error> {
        debug!(file, name = ?network.name, "creating network");
        let resp = self.post(&lab_path(file, "/networks"), Some(network)).await?;
        let created: CreatedId = envelope::data(resp, 201).await?;
        assigned_id(created.id)
    }

    /// Partial update; `network` carries only the changed fields plus `id`.
    ///
    /// `PUT api/labs<file>/networks/<id>`; success is envelope code 200.
    pub async fn update_network(
        &self,
        file: &str,
        id: u32,
        network: &NetworkPayload,
    ) -> Result<(), Error> {
        debug!(file, id, "updating network");
        let resp = self
            .put(&lab_path(file, &format!("/networks/{id}")), Some(network))
            .await?;
        envelope::expect_code::<IgnoredAny>(resp, 200).await?;
        Ok(())
    }

    /// `DELETE api/labs<file>/networks/<id>`; success is envelope code 200.
    pub async fn delete_network(&self, file: &str, id: u32) -> Result<(), Error> {
        debug!(file, id, "deleting network");
        let resp = self.delete(&lab_path(file, &format!("/networks/{id}"))).await?;
        envelope::expect_code::<IgnoredAny>(resp, 200).await?;
        Ok(())
    }
}

/// Convert a create reply's id into the numeric id used in paths.
pub(crate) fn assigned_id(id: Option<i64>) -> Result<u32, Error> {
    id.and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| Error::Decode {
            message: "create reply carried no usable id".into(),
            body: format!("{id:?}"),
        })
}
