// ── Lab ──
//
// Identified by its lab file. The platform has no lab update endpoint,
// so every attribute is recreate-only.

use eveng_api::Session;
use eveng_api::models::NewLab;

use crate::error::CoreError;
use crate::identity::{lab_file, normalize_path, split_lab_file};
use crate::reconcile::{Observed, Record, Resource, differs};

use super::{parse_lab_file, path_differs, required};

/// Version reported when the platform omits one.
const DEFAULT_VERSION: &str = "1";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabSpec {
    /// Parent folder.
    pub path: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub version: Option<String>,
    pub scripttimeout: Option<i64>,
    pub lock: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabState {
    /// `/folder/name.unl`
    pub file: String,
    /// Platform-assigned UUID.
    pub uuid: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lab;

impl Resource for Lab {
    const KIND: &'static str = "lab";
    type Spec = LabSpec;
    type State = LabState;
    type Key = String;

    fn parse_id(id: &str) -> Option<String> {
        parse_lab_file(id)
    }

    fn format_id(key: &String) -> String {
        key.clone()
    }

    async fn create(session: &Session, spec: &LabSpec) -> Result<(String, LabState), CoreError> {
        let path = normalize_path(required(&spec.path, "path")?);
        let name = required(&spec.name, "name")?;

        let request = NewLab {
            path: path.clone(),
            name: name.clone(),
            author: spec.author.clone(),
            description: spec.description.clone(),
            body: spec.body.clone(),
            version: spec.version.clone(),
            scripttimeout: spec.scripttimeout,
            lock: spec.lock,
        };
        session.create_lab(&request).await?;
        Ok((lab_file(&path, name), LabState::default()))
    }

    async fn read(
        session: &Session,
        file: &String,
        _prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        let lab = session.get_lab(file).await?;
        let (folder, file_name) = split_lab_file(file);

        let spec = LabSpec {
            path: Some(folder),
            name: Some(if lab.name.is_empty() { file_name } else { lab.name }),
            author: Some(lab.author),
            description: Some(lab.description),
            body: Some(lab.body),
            version: Some(lab.version.unwrap_or_else(|| DEFAULT_VERSION.to_owned())),
            scripttimeout: Some(lab.scripttimeout),
            lock: Some(lab.lock),
        };
        let state = LabState {
            file: file.clone(),
            uuid: lab.id,
        };
        Ok((spec, state))
    }

    async fn delete(session: &Session, file: &String, _spec: &LabSpec) -> Result<(), CoreError> {
        session.delete_lab(file).await?;
        Ok(())
    }

    fn requires_replacement(prior: &LabSpec, desired: &LabSpec) -> bool {
        path_differs(&prior.path, &desired.path)
            || differs(&prior.name, &desired.name)
            || differs(&prior.author, &desired.author)
            || differs(&prior.description, &desired.description)
            || differs(&prior.body, &desired.body)
            || differs(&prior.version, &desired.version)
            || differs(&prior.scripttimeout, &desired.scripttimeout)
            || differs(&prior.lock, &desired.lock)
    }
}
