// ── Lab clone ──
//
// `<cloned lab>:clone`. The record tracks the copy; deleting it leaves
// the copy on the server.

use eveng_api::Session;
use eveng_api::models::CloneLab;
use tracing::debug;

use crate::error::CoreError;
use crate::identity::{
    Discriminator, decode_marker, directory, encode_marker, lab_file, normalize_path, split_lab_file,
};
use crate::reconcile::{Observed, Record, Resource, differs};

use super::{file_differs, path_differs, required};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloneSpec {
    pub source_lab_file: Option<String>,
    pub destination_path: Option<String>,
    pub new_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloneState {
    pub cloned_lab_file: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabClone;

impl Resource for LabClone {
    const KIND: &'static str = "lab clone";
    type Spec = CloneSpec;
    type State = CloneState;
    /// The cloned lab file.
    type Key = String;

    fn parse_id(id: &str) -> Option<String> {
        decode_marker(id, Discriminator::Clone)
    }

    fn format_id(key: &String) -> String {
        encode_marker(key, Discriminator::Clone)
    }

    async fn create(session: &Session, spec: &CloneSpec) -> Result<(String, CloneState), CoreError> {
        let source = normalize_path(required(&spec.source_lab_file, "source_lab_file")?);
        let destination = directory(required(&spec.destination_path, "destination_path")?);
        let name = required(&spec.new_name, "new_name")?;

        session
            .clone_lab(
                &source,
                &CloneLab {
                    path: destination.clone(),
                    name: name.clone(),
                },
            )
            .await?;
        let cloned = lab_file(&destination, name);
        debug!(%source, %cloned, "lab cloned");
        Ok((cloned, CloneState::default()))
    }

    async fn read(
        session: &Session,
        cloned: &String,
        prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        session.get_lab(cloned).await?;
        let (folder, name) = split_lab_file(cloned);
        let spec = CloneSpec {
            source_lab_file: prior.spec.source_lab_file.clone(),
            destination_path: Some(folder),
            new_name: Some(name),
        };
        let state = CloneState {
            cloned_lab_file: cloned.clone(),
        };
        Ok((spec, state))
    }

    async fn delete(_session: &Session, cloned: &String, _spec: &CloneSpec) -> Result<(), CoreError> {
        debug!(%cloned, "forgetting clone; the copy stays");
        Ok(())
    }

    fn requires_replacement(prior: &CloneSpec, desired: &CloneSpec) -> bool {
        file_differs(&prior.source_lab_file, &desired.source_lab_file)
            || path_differs(&prior.destination_path, &desired.destination_path)
            || differs(&prior.new_name, &desired.new_name)
    }
}
