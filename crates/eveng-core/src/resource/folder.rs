// ── Folder ──

use eveng_api::Session;
use eveng_api::models::NewFolder;
use tracing::debug;

use crate::error::CoreError;
use crate::identity::{child_path, directory, normalize_path, split_path};
use crate::reconcile::{Observed, Record, Resource, differs};

use super::{path_differs, required};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderSpec {
    /// Parent folder.
    pub path: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderState {
    pub full_path: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Folder;

fn observed(full: &str) -> Observed<Folder> {
    let (parent, name) = split_path(full);
    (
        FolderSpec {
            path: Some(parent),
            name: Some(name),
        },
        FolderState {
            full_path: full.to_owned(),
        },
    )
}

impl Resource for Folder {
    const KIND: &'static str = "folder";
    type Spec = FolderSpec;
    type State = FolderState;
    type Key = String;

    fn parse_id(id: &str) -> Option<String> {
        (id.starts_with('/') && !id.contains(':')).then(|| id.to_owned())
    }

    fn format_id(key: &String) -> String {
        key.clone()
    }

    async fn create(
        session: &Session,
        spec: &FolderSpec,
    ) -> Result<(String, FolderState), CoreError> {
        let parent = directory(required(&spec.path, "path")?);
        let name = required(&spec.name, "name")?;
        if name.is_empty() || name.contains('/') {
            return Err(CoreError::Validation {
                field: "name",
                reason: format!("'{name}' is not a single path segment"),
            });
        }

        session
            .create_folder(&NewFolder {
                path: parent.clone(),
                name: name.clone(),
            })
            .await?;
        Ok((child_path(&parent, name), FolderState::default()))
    }

    async fn read(
        session: &Session,
        full: &String,
        _prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        session.get_folder(full).await?;
        Ok(observed(full))
    }

    /// Look for the folder among its parent's subfolders.
    async fn read_from_list(
        session: &Session,
        full: &String,
        _prior: &Record<Self>,
    ) -> Result<Option<Observed<Self>>, CoreError> {
        let (parent, name) = split_path(full);
        let listing = session.get_folder(&parent).await?;
        let found = listing.folders.iter().any(|f| {
            normalize_path(&f.path) == *full || (f.path.is_empty() && f.name == name)
        });
        debug!(folder = %full, found, "checked parent listing");
        Ok(found.then(|| observed(full)))
    }

    async fn delete(session: &Session, full: &String, _spec: &FolderSpec) -> Result<(), CoreError> {
        if full == "/" {
            return Err(CoreError::Validation {
                field: "path",
                reason: "the root folder cannot be deleted".into(),
            });
        }
        session.delete_folder(full).await?;
        Ok(())
    }

    fn requires_replacement(prior: &FolderSpec, desired: &FolderSpec) -> bool {
        path_differs(&prior.path, &desired.path) || differs(&prior.name, &desired.name)
    }
}
