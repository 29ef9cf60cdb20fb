// ── Lab move ──
//
// `<moved lab>:move`. Changing the destination or the name moves the lab
// again from wherever the identifier says it is now.

use eveng_api::Session;
use eveng_api::models::MoveLab;
use tracing::debug;

use crate::error::CoreError;
use crate::identity::{
    Discriminator, decode_marker, directory, encode_marker, lab_file, normalize_path, split_lab_file,
};
use crate::reconcile::{Observed, Record, Resource, differs};

use super::{file_differs, path_differs, required};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveSpec {
    /// The lab to move, at its original location.
    pub lab_file: Option<String>,
    /// Informational; the folder the lab was moved out of.
    pub source_path: Option<String>,
    pub destination_path: Option<String>,
    /// Keep the current name when unset.
    pub new_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveState {
    pub moved_lab_file: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabMove;

/// Move `from` into `destination`, optionally renaming it. Returns the new
/// lab file.
async fn relocate(
    session: &Session,
    from: &str,
    destination: &str,
    new_name: Option<&String>,
) -> Result<String, CoreError> {
    let destination = directory(destination);
    session
        .move_lab(
            from,
            &MoveLab {
                path: destination.clone(),
                name: new_name.cloned(),
            },
        )
        .await?;

    let name = match new_name {
        Some(name) => name.clone(),
        None => split_lab_file(from).1,
    };
    let moved = lab_file(&destination, &name);
    debug!(%from, %moved, "lab moved");
    Ok(moved)
}

impl Resource for LabMove {
    const KIND: &'static str = "lab move";
    type Spec = MoveSpec;
    type State = MoveState;
    type Key = String;

    fn parse_id(id: &str) -> Option<String> {
        decode_marker(id, Discriminator::Move)
    }

    fn format_id(key: &String) -> String {
        encode_marker(key, Discriminator::Move)
    }

    async fn create(session: &Session, spec: &MoveSpec) -> Result<(String, MoveState), CoreError> {
        let from = normalize_path(required(&spec.lab_file, "lab_file")?);
        let destination = required(&spec.destination_path, "destination_path")?;
        let moved = relocate(session, &from, destination, spec.new_name.as_ref()).await?;
        Ok((moved, MoveState::default()))
    }

    async fn read(
        session: &Session,
        moved: &String,
        prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        session.get_lab(moved).await?;
        let (folder, name) = split_lab_file(moved);
        let spec = MoveSpec {
            lab_file: prior.spec.lab_file.clone(),
            source_path: prior.spec.source_path.clone(),
            destination_path: Some(folder),
            new_name: Some(name),
        };
        let state = MoveState {
            moved_lab_file: moved.clone(),
        };
        Ok((spec, state))
    }

    async fn update(
        session: &Session,
        moved: &String,
        prior: &MoveSpec,
        desired: &MoveSpec,
    ) -> Result<String, CoreError> {
        let destination = desired
            .destination_path
            .as_ref()
            .or(prior.destination_path.as_ref())
            .map_or_else(|| split_lab_file(moved).0, Clone::clone);
        relocate(session, moved, &destination, desired.new_name.as_ref()).await
    }

    async fn delete(_session: &Session, _moved: &String, _spec: &MoveSpec) -> Result<(), CoreError> {
        Ok(())
    }

    fn requires_replacement(prior: &MoveSpec, desired: &MoveSpec) -> bool {
        file_differs(&prior.lab_file, &desired.lab_file)
            || path_differs(&prior.source_path, &desired.source_path)
    }

    fn has_changes(prior: &MoveSpec, desired: &MoveSpec) -> bool {
        path_differs(&prior.destination_path, &desired.destination_path)
            || differs(&prior.new_name, &desired.new_name)
    }
}
