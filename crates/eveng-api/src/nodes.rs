// Lab node endpoints
//
// Covers node CRUD, the power actions (`start`/`stop`/`wipe`, all plain
// GETs), and the per-node interface map used for attachments.

use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use tracing::debug;

use crate::envelope;
use crate::error::Error;
use crate::labs::lab_path;
use crate::models::{CreatedId, InterfaceLink, Node, NodeAction, NodeInterfaces, NodePayload};
use crate::networks::assigned_id;
use crate::session::Session;
use crate::variant::Keyed;

impl Session {
    /// All nodes of a lab, keyed by node id.
    ///
    /// `GET api/labs<file>/nodes`
    pub async fn list_nodes(&self, file: &str) -> Result<Keyed<Node>, Error> {
        let resp = self.get(&lab_path(file, "/nodes")).await?;
        envelope::data(resp, 200).await
    }

    /// `GET api/labs<file>/nodes/<id>`
    pub async fn get_node(&self, file: &str, id: u32) -> Result<Node, Error> {
        let resp = self.get(&lab_path(file, &format!("/nodes/{id}"))).await?;
        envelope::data(resp, 200).await
    }

    /// Create a node and return its id. The reply's `id` may be a number
    /// or a one-element array.
    ///
    /// `POST api/labs<file>/nodes`; success is envelope code 201.
    pub async fn create_node(&self, file: &str, node: &NodePayload) -> Result<u32, Error> {
        debug!(file, name = ?node.name, template = ?node.template, "creating node");
        let resp = self.post(&lab_path(file, "/nodes"), Some(node)).await?;
        let created: CreatedId = envelope::data(resp, 201).await?;
        assigned_id(created.id)
    }

    /// `PUT api/labs<file>/nodes/<id>`; success is envelope code 200.
    pub async fn update_node(&self, file: &str, id: u32, node: &NodePayload) -> Result<(), Error> {
        debug!(file, id, "updating node");
        let resp = self
            .put(&lab_path(file, &format!("/nodes/{id}")), Some(node))
            .await?;
        envelope::expect_code::<IgnoredAny>(resp, 200).await?;
        Ok(())
    }

    /// `DELETE api/labs<file>/nodes/<id>`; success is envelope code 200.
    pub async fn delete_node(&self, file: &str, id: u32) -> Result<(), Error> {
        debug!(file, id, "deleting node");
        let resp = self.delete(&lab_path(file, &format!("/nodes/{id}"))).await?;
        envelope::expect_code::<IgnoredAny>(resp, 200).await?;
        Ok(())
    }

    /// Power action on a single node.
    ///
    /// `GET api/labs<file>/nodes/<id>/<action>`
    pub async fn node_action(&self, file: &str, id: u32, action: NodeAction) -> Result<(), Error> {
        debug!(file, id, action = action.as_str(), "node action");
        let path = lab_path(file, &format!("/nodes/{id}/{}", action.as_str()));
        let resp = self.get(&path).await?;
        envelope::check(resp).await
    }

    /// `GET api/labs<file>/nodes/<id>/interfaces`
    pub async fn get_interfaces(&self, file: &str, node: u32) -> Result<NodeInterfaces, Error> {
        let resp = self
            .get(&lab_path(file, &format!("/nodes/{node}/interfaces")))
            .await?;
        envelope::data(resp, 200).await
    }

    /// Point interface `index` of `node` at `link`.
    ///
    /// `PUT api/labs<file>/nodes/<id>/interfaces` with `{"<index>": link}`
    pub async fn set_interface(
        &self,
        file: &str,
        node: u32,
        index: u32,
        link: &InterfaceLink,
    ) -> Result<(), Error> {
        debug!(file, node, index, ?link, "setting interface");
        let body = BTreeMap::from([(index.to_string(), link)]);
        let resp = self
            .put(&lab_path(file, &format!("/nodes/{node}/interfaces")), Some(&body))
            .await?;
        envelope::check(resp).await
    }
}
