// ── Managed resource kinds ──
//
// One `Resource` implementation per kind. Objects (lab, folder, network,
// node, interface attachment, user, system config) map onto CRUD calls;
// transitions (clone, export, move, lock, monitoring, batch power) model a
// one-shot change whose identifier names the resulting target.

mod folder;
mod interface;
mod lab;
mod lab_batch;
mod lab_clone;
mod lab_export;
mod lab_lock;
mod lab_monitoring;
mod lab_move;
mod network;
mod node;
mod system_config;
mod user;

pub use folder::{Folder, FolderSpec, FolderState};
pub use interface::{AttachTarget, InterfaceAttachment, InterfaceSpec, InterfaceState};
pub use lab::{Lab, LabSpec, LabState};
pub use lab_batch::{BatchAction, BatchSpec, LabBatch, StartNodes, StopNodes, WipeNodes};
pub use lab_clone::{CloneSpec, CloneState, LabClone};
pub use lab_export::{ExportSpec, ExportState, LabExport};
pub use lab_lock::{LabLock, LockSpec, LockState};
pub use lab_monitoring::{LabMonitoring, MonitoringSpec, MonitoringState};
pub use lab_move::{LabMove, MoveSpec, MoveState};
pub use network::{Network, NetworkSpec, NetworkState};
pub use node::{Node, NodeSpec, NodeState, PowerState};
pub use system_config::{SystemConfig, SystemConfigKey, SystemConfigSpec};
pub use user::{Password, User, UserSpec, UserState};

use crate::error::CoreError;
use crate::identity::{directory, normalize_path};

/// A required attribute, or a validation error naming it.
pub(crate) fn required<'a, T>(value: &'a Option<T>, field: &'static str) -> Result<&'a T, CoreError> {
    value.as_ref().ok_or_else(|| CoreError::Validation {
        field,
        reason: "must be set".into(),
    })
}

/// Whether a desired folder path differs from the prior one, ignoring a
/// missing leading or trailing slash.
pub(crate) fn path_differs(prior: &Option<String>, desired: &Option<String>) -> bool {
    match desired {
        Some(d) => prior.as_deref().map(directory) != Some(directory(d)),
        None => false,
    }
}

/// Whether a desired lab file differs from the prior one, ignoring a
/// missing leading slash.
pub(crate) fn file_differs(prior: &Option<String>, desired: &Option<String>) -> bool {
    match desired {
        Some(d) => prior.as_deref().map(normalize_path) != Some(normalize_path(d)),
        None => false,
    }
}

/// Natural-key identifiers for labs: an absolute `.unl` path.
pub(crate) fn parse_lab_file(id: &str) -> Option<String> {
    (id.starts_with('/') && id.ends_with(".unl") && !id.contains(':')).then(|| id.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn path_differs_normalizes_slashes() {
        assert!(!path_differs(&Some("/team".into()), &Some("team/".into())));
        assert!(path_differs(&Some("/team".into()), &Some("/other".into())));
        assert!(!path_differs(&Some("/team".into()), &None));
        assert!(path_differs(&None, &Some("/".into())));
    }

    #[test]
    fn file_differs_normalizes_leading_slash() {
        assert!(!file_differs(&Some("/demo.unl".into()), &Some("demo.unl".into())));
        assert!(file_differs(&Some("/demo.unl".into()), &Some("/other.unl".into())));
    }

    #[test]
    fn lab_file_ids() {
        assert_eq!(parse_lab_file("/demo.unl").as_deref(), Some("/demo.unl"));
        assert!(parse_lab_file("/demo.unl:network:1").is_none());
        assert!(parse_lab_file("demo").is_none());
    }

    #[test]
    fn required_names_the_field() {
        let err = required::<String>(&None, "lab_file").unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for 'lab_file': must be set");
    }
}
