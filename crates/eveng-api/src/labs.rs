// Lab endpoints
//
// Labs are addressed by their `.unl` file path (`/folder/demo.unl`), which
// is appended verbatim after `api/labs`. Transitions on a lab (clone, move,
// export, lock, batch power) live here too because they share that prefix.

use serde::de::IgnoredAny;
use tracing::debug;

use crate::envelope::{self, Envelope};
use crate::error::Error;
use crate::models::{BatchNodes, CloneLab, ExportLab, Lab, LabExport, MoveLab, NewLab, NodeAction};
use crate::session::Session;

/// `api/labs/<file><rest>`, tolerating a lab file without a leading slash.
pub(crate) fn lab_path(file: &str, rest: &str) -> String {
    format!("api/labs/{}{rest}", file.trim_start_matches('/'))
}

impl Session {
    /// Create a lab.
    ///
    /// `POST api/labs`; success is envelope code 200.
    pub async fn create_lab(&self, lab: &NewLab) -> Result<(), Error> {
        debug!(path = %lab.path, name = %lab.name, "creating lab");
        let resp = self.post("api/labs", Some(lab)).await?;
        envelope::expect_code::<IgnoredAny>(resp, 200).await?;
        Ok(())
    }

    /// Fetch lab metadata.
    ///
    /// `GET api/labs<file>`
    pub async fn get_lab(&self, file: &str) -> Result<Lab, Error> {
        let resp = self.get(&lab_path(file, "")).await?;
        envelope::data(resp, 200).await
    }

    /// Delete a lab file.
    ///
    /// `DELETE api/labs<file>`; success is envelope code 200.
    pub async fn delete_lab(&self, file: &str) -> Result<(), Error> {
        debug!(file, "deleting lab");
        let resp = self.delete(&lab_path(file, "")).await?;
        envelope::expect_code::<IgnoredAny>(resp, 200).await?;
        Ok(())
    }

    /// Copy a lab to `request.path` under `request.name`.
    ///
    /// `POST api/labs<file>/clone`
    pub async fn clone_lab(&self, file: &str, request: &CloneLab) -> Result<(), Error> {
        debug!(file, to = %request.path, name = %request.name, "cloning lab");
        let resp = self.post(&lab_path(file, "/clone"), Some(request)).await?;
        envelope::check(resp).await
    }

    /// Relocate (and optionally rename) a lab.
    ///
    /// `PUT api/labs<file>/move`
    pub async fn move_lab(&self, file: &str, request: &MoveLab) -> Result<(), Error> {
        debug!(file, to = %request.path, "moving lab");
        let resp = self.put(&lab_path(file, "/move"), Some(request)).await?;
        envelope::check(resp).await
    }

    /// Export a lab. A reply without `data` yields empty fields.
    ///
    /// `POST api/labs<file>/export`
    pub async fn export_lab(&self, file: &str, request: &ExportLab) -> Result<LabExport, Error> {
        debug!(file, format = %request.format, "exporting lab");
        let resp = self.post(&lab_path(file, "/export"), Some(request)).await?;
        let env: Envelope<LabExport> = envelope::decode(resp).await?;
        Ok(env.ensure_success()?.data.unwrap_or_default())
    }

    /// `PUT api/labs<file>/Lock`
    pub async fn lock_lab(&self, file: &str) -> Result<(), Error> {
        debug!(file, "locking lab");
        let resp = self.put::<()>(&lab_path(file, "/Lock"), None).await?;
        envelope::check(resp).await
    }

    /// `PUT api/labs<file>/Unlock`
    pub async fn unlock_lab(&self, file: &str) -> Result<(), Error> {
        debug!(file, "unlocking lab");
        let resp = self.put::<()>(&lab_path(file, "/Unlock"), None).await?;
        envelope::check(resp).await
    }

    /// Start, stop or wipe several nodes at once. An empty `nodes` list
    /// applies to every node in the lab.
    ///
    /// `POST api/labs<file>/nodes/<action>`
    pub async fn batch_nodes(
        &self,
        file: &str,
        action: NodeAction,
        nodes: &BatchNodes,
    ) -> Result<(), Error> {
        debug!(file, action = action.as_str(), count = nodes.nodes.len(), "batch node action");
        let path = lab_path(file, &format!("/nodes/{}", action.as_str()));
        let resp = self.post(&path, Some(nodes)).await?;
        envelope::check(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::lab_path;

    #[test]
    fn lab_path_appends_file_after_prefix() {
        assert_eq!(lab_path("/demo.unl", ""), "api/labs/demo.unl");
        assert_eq!(lab_path("/a/b.unl", "/networks/3"), "api/labs/a/b.unl/networks/3");
        assert_eq!(lab_path("demo.unl", "/Lock"), "api/labs/demo.unl/Lock");
    }
}
