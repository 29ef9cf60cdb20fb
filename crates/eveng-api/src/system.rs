// System endpoints
//
// Server status, the host-wide toggles (CPU limiting, KSM, UKSM), and the
// read-only catalogs under `api/list/`.

use serde_json::json;
use tracing::debug;

use crate::envelope;
use crate::error::Error;
use crate::models::{Catalog, SystemStatus};
use crate::session::Session;

impl Session {
    /// `GET api/status`
    pub async fn status(&self) -> Result<SystemStatus, Error> {
        let resp = self.get("api/status").await?;
        envelope::data(resp, 200).await
    }

    /// `POST api/cpulimit` with `{"cpulimit": n}`
    pub async fn set_cpu_limit(&self, limit: i64) -> Result<(), Error> {
        debug!(limit, "setting cpu limit");
        let resp = self.post("api/cpulimit", Some(&json!({ "cpulimit": limit }))).await?;
        envelope::check(resp).await
    }

    /// `POST api/ksm` with `{"ksm": bool}`
    pub async fn set_ksm(&self, enabled: bool) -> Result<(), Error> {
        debug!(enabled, "setting ksm");
        let resp = self.post("api/ksm", Some(&json!({ "ksm": enabled }))).await?;
        envelope::check(resp).await
    }

    /// `POST api/uksm` with `{"uksm": bool}`
    pub async fn set_uksm(&self, enabled: bool) -> Result<(), Error> {
        debug!(enabled, "setting uksm");
        let resp = self.post("api/uksm", Some(&json!({ "uksm": enabled }))).await?;
        envelope::check(resp).await
    }

    /// Node templates, keyed by template name.
    ///
    /// `GET api/list/templates/`
    pub async fn list_templates(&self) -> Result<Catalog, Error> {
        let resp = self.get("api/list/templates/").await?;
        envelope::data(resp, 200).await
    }

    /// Network types, keyed by type name.
    ///
    /// `GET api/list/networks`
    pub async fn list_network_types(&self) -> Result<Catalog, Error> {
        let resp = self.get("api/list/networks").await?;
        envelope::data(resp, 200).await
    }

    /// Node icons, keyed by file name.
    ///
    /// `GET api/list/icons`
    pub async fn list_icons(&self) -> Result<Catalog, Error> {
        let resp = self.get("api/list/icons").await?;
        envelope::data(resp, 200).await
    }
}
