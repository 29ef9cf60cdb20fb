// ── Interface attachment ──
//
// `<lab>:ifattach:<node>:<index>`. Connects one node interface either to a
// lab network or point-to-point to another node. There is no interface
// object on the platform side: create and update both rewrite the
// interface map entry, delete writes `0` back.

use std::fmt;
use std::str::FromStr;

use eveng_api::Session;
use eveng_api::models::InterfaceLink;

use crate::error::CoreError;
use crate::identity::{InterfaceId, normalize_path};
use crate::reconcile::{Observed, Record, Resource, differs};

use super::{file_differs, required};

/// Where an interface points.
///
/// Written as `network:<id>` or `node:<remote_id>[:<remote_if>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachTarget {
    Network(u32),
    Node(String),
}

impl AttachTarget {
    fn link(&self) -> InterfaceLink {
        match self {
            Self::Network(id) => InterfaceLink::Network(*id),
            Self::Node(remote) => InterfaceLink::Remote(remote.clone()),
        }
    }
}

impl FromStr for AttachTarget {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::Validation {
            field: "target",
            reason: format!("'{s}' is neither network:<id> nor node:<id>[:<interface>]"),
        };
        match s.split_once(':') {
            Some(("network", id)) => match id.parse::<u32>() {
                Ok(id) if id > 0 => Ok(Self::Network(id)),
                _ => Err(invalid()),
            },
            Some(("node", remote)) => {
                let valid = remote
                    .split(':')
                    .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
                if valid && remote.split(':').count() <= 2 {
                    Ok(Self::Node(remote.to_owned()))
                } else {
                    Err(invalid())
                }
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for AttachTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(id) => write!(f, "network:{id}"),
            Self::Node(remote) => write!(f, "node:{remote}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceSpec {
    pub lab_file: Option<String>,
    pub node_id: Option<u32>,
    pub interface_index: Option<u32>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceState {
    /// Attached network, `0` for point-to-point links.
    pub network_id: u32,
    /// Interface name as shown by the platform (`e0`, `Gi0/1`).
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceAttachment;

fn target_of(spec: &InterfaceSpec) -> Result<AttachTarget, CoreError> {
    required(&spec.target, "target")?.parse()
}

async fn locate(session: &Session, key: &InterfaceId) -> Result<(AttachTarget, String), CoreError> {
    let interfaces = session.get_interfaces(&key.lab, key.node).await?;
    let index = key.index.to_string();

    if let Some(eth) = interfaces.ethernet.get(&index) {
        if let Ok(id @ 1..) = u32::try_from(eth.network_id) {
            return Ok((AttachTarget::Network(id), eth.name.clone()));
        }
    }
    if let Some(serial) = interfaces.serial.get(&index) {
        if let Some(remote) = serial.remote_id.filter(|id| *id > 0) {
            let target = match serial.remote_if {
                Some(remote_if) => format!("{remote}:{remote_if}"),
                None => remote.to_string(),
            };
            return Ok((AttachTarget::Node(target), serial.name.clone()));
        }
    }
    Err(CoreError::NotFound {
        kind: InterfaceAttachment::KIND,
        id: key.to_string(),
    })
}

impl Resource for InterfaceAttachment {
    const KIND: &'static str = "interface attachment";
    type Spec = InterfaceSpec;
    type State = InterfaceState;
    type Key = InterfaceId;

    fn parse_id(id: &str) -> Option<InterfaceId> {
        InterfaceId::parse(id)
    }

    fn format_id(key: &InterfaceId) -> String {
        key.to_string()
    }

    async fn create(
        session: &Session,
        spec: &InterfaceSpec,
    ) -> Result<(InterfaceId, InterfaceState), CoreError> {
        let key = InterfaceId {
            lab: normalize_path(required(&spec.lab_file, "lab_file")?),
            node: *required(&spec.node_id, "node_id")?,
            index: *required(&spec.interface_index, "interface_index")?,
        };
        let target = target_of(spec)?;
        session
            .set_interface(&key.lab, key.node, key.index, &target.link())
            .await?;
        Ok((key, InterfaceState::default()))
    }

    async fn read(
        session: &Session,
        key: &InterfaceId,
        _prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        let (target, name) = locate(session, key).await?;
        let network_id = match target {
            AttachTarget::Network(id) => id,
            AttachTarget::Node(_) => 0,
        };
        let spec = InterfaceSpec {
            lab_file: Some(key.lab.clone()),
            node_id: Some(key.node),
            interface_index: Some(key.index),
            target: Some(target.to_string()),
        };
        Ok((spec, InterfaceState { network_id, name }))
    }

    async fn update(
        session: &Session,
        key: &InterfaceId,
        _prior: &InterfaceSpec,
        desired: &InterfaceSpec,
    ) -> Result<InterfaceId, CoreError> {
        let target = target_of(desired)?;
        session
            .set_interface(&key.lab, key.node, key.index, &target.link())
            .await?;
        Ok(key.clone())
    }

    async fn delete(session: &Session, key: &InterfaceId, _spec: &InterfaceSpec) -> Result<(), CoreError> {
        session
            .set_interface(&key.lab, key.node, key.index, &InterfaceLink::DETACHED)
            .await?;
        Ok(())
    }

    fn requires_replacement(prior: &InterfaceSpec, desired: &InterfaceSpec) -> bool {
        file_differs(&prior.lab_file, &desired.lab_file)
            || differs(&prior.node_id, &desired.node_id)
            || differs(&prior.interface_index, &desired.interface_index)
    }

    fn has_changes(prior: &InterfaceSpec, desired: &InterfaceSpec) -> bool {
        let parsed = |t: &Option<String>| t.as_deref().map(str::parse::<AttachTarget>);
        match (parsed(&prior.target), parsed(&desired.target)) {
            (_, None) => false,
            (Some(Ok(p)), Some(Ok(d))) => p != d,
            _ => differs(&prior.target, &desired.target),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn targets_parse_both_shapes() {
        assert_eq!("network:4".parse::<AttachTarget>().unwrap(), AttachTarget::Network(4));
        assert_eq!(
            "node:2:1".parse::<AttachTarget>().unwrap(),
            AttachTarget::Node("2:1".into())
        );
        assert_eq!("node:2".parse::<AttachTarget>().unwrap().to_string(), "node:2");
    }

    #[test]
    fn malformed_targets_are_rejected() {
        for bad in ["4", "network:", "network:0", "network:x", "node:", "node:a", "node:1:2:3", "bridge:1"] {
            assert!(bad.parse::<AttachTarget>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn link_values_follow_the_target() {
        assert_eq!(AttachTarget::Network(3).link(), InterfaceLink::Network(3));
        assert_eq!(
            AttachTarget::Node("5".into()).link(),
            InterfaceLink::Remote("5".into())
        );
    }

    #[test]
    fn index_change_requires_replacement() {
        let prior = InterfaceSpec {
            lab_file: Some("/demo.unl".into()),
            node_id: Some(1),
            interface_index: Some(0),
            target: Some("network:1".into()),
        };
        let desired = InterfaceSpec {
            interface_index: Some(1),
            ..prior.clone()
        };
        assert!(InterfaceAttachment::requires_replacement(&prior, &desired));
        assert!(!InterfaceAttachment::has_changes(&prior, &prior));
    }
}
