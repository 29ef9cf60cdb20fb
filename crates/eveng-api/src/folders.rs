// Folder endpoints

use tracing::debug;

use crate::envelope;
use crate::error::Error;
use crate::models::{FolderListing, NewFolder};
use crate::session::Session;

/// `api/folders<path>`; the root lists as `api/folders/`.
fn folder_path(path: &str) -> String {
    format!("api/folders/{}", path.trim_start_matches('/'))
}

impl Session {
    /// `POST api/folders` with `{path, name}`; `path` is the parent.
    pub async fn create_folder(&self, folder: &NewFolder) -> Result<(), Error> {
        debug!(parent = %folder.path, name = %folder.name, "creating folder");
        let resp = self.post("api/folders", Some(folder)).await?;
        envelope::check(resp).await
    }

    /// Subfolders and labs directly inside `path`.
    ///
    /// `GET api/folders<path>`
    pub async fn get_folder(&self, path: &str) -> Result<FolderListing, Error> {
        let resp = self.get(&folder_path(path)).await?;
        envelope::data(resp, 200).await
    }

    /// `DELETE api/folders<path>`
    pub async fn delete_folder(&self, path: &str) -> Result<(), Error> {
        debug!(path, "deleting folder");
        let resp = self.delete(&folder_path(path)).await?;
        envelope::check(resp).await
    }
}
