// ── Node ──
//
// `<lab>:node:<id>`. Besides the node definition, a node carries a
// desired power state that is converged with the start/stop actions, and
// two lifecycle flags: stop before applying changes, wipe before delete.

use eveng_api::Session;
use eveng_api::models::{Node as WireNode, NodeAction, NodePayload};
use strum::{Display, EnumString};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::identity::{Discriminator, LabChildId, normalize_path};
use crate::reconcile::{Observed, Record, Resource, changed, differs};

use super::{file_differs, required};

/// Power state a node should be in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PowerState {
    Started,
    #[default]
    Stopped,
}

impl PowerState {
    fn action(self) -> NodeAction {
        match self {
            Self::Started => NodeAction::Start,
            Self::Stopped => NodeAction::Stop,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSpec {
    pub lab_file: Option<String>,
    pub name: Option<String>,
    /// `qemu`, `iol`, `dynamips`, `vpcs`, `docker`.
    pub node_type: Option<String>,
    pub template: Option<String>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub top: Option<i64>,
    pub left: Option<i64>,
    pub delay: Option<i64>,
    pub config: Option<String>,
    pub ethernet: Option<i64>,
    pub serial: Option<i64>,
    pub cpu: Option<i64>,
    pub ram: Option<i64>,
    pub cpulimit: Option<bool>,
    pub uuid: Option<String>,
    pub qemu_version: Option<String>,
    pub qemu_arch: Option<String>,
    pub qemu_nic: Option<String>,
    pub qemu_options: Option<String>,
    pub firstmac: Option<String>,
    pub timos_line: Option<String>,
    pub timos_license: Option<String>,
    pub management_address: Option<String>,

    pub desired_state: Option<PowerState>,
    /// Stop the node before pushing attribute changes, then restore power.
    pub reboot_on_change: Option<bool>,
    /// Wipe the node's disks before deleting it.
    pub wipe_on_destroy: Option<bool>,
}

impl NodeSpec {
    /// The platform-side attributes, ignoring `lab_file` and lifecycle flags.
    fn payload(&self) -> NodePayload {
        NodePayload {
            id: None,
            name: self.name.clone(),
            node_type: self.node_type.clone(),
            template: self.template.clone(),
            image: self.image.clone(),
            icon: self.icon.clone(),
            top: self.top,
            left: self.left,
            delay: self.delay,
            config: self.config.clone(),
            ethernet: self.ethernet,
            serial: self.serial,
            cpu: self.cpu,
            ram: self.ram,
            cpulimit: self.cpulimit,
            uuid: self.uuid.clone(),
            qemu_version: self.qemu_version.clone(),
            qemu_arch: self.qemu_arch.clone(),
            qemu_nic: self.qemu_nic.clone(),
            qemu_options: self.qemu_options.clone(),
            firstmac: self.firstmac.clone(),
            timos_line: self.timos_line.clone(),
            timos_license: self.timos_license.clone(),
            management_address: self.management_address.clone(),
        }
    }
}

/// Fields of `desired` that differ from `prior`; `None` everywhere else.
fn diff_payload(prior: &NodeSpec, desired: &NodeSpec) -> NodePayload {
    let (p, d) = (prior.payload(), desired.payload());
    NodePayload {
        id: None,
        name: changed(&p.name, &d.name),
        node_type: changed(&p.node_type, &d.node_type),
        template: changed(&p.template, &d.template),
        image: changed(&p.image, &d.image),
        icon: changed(&p.icon, &d.icon),
        top: changed(&p.top, &d.top),
        left: changed(&p.left, &d.left),
        delay: changed(&p.delay, &d.delay),
        config: changed(&p.config, &d.config),
        ethernet: changed(&p.ethernet, &d.ethernet),
        serial: changed(&p.serial, &d.serial),
        cpu: changed(&p.cpu, &d.cpu),
        ram: changed(&p.ram, &d.ram),
        cpulimit: changed(&p.cpulimit, &d.cpulimit),
        uuid: changed(&p.uuid, &d.uuid),
        qemu_version: changed(&p.qemu_version, &d.qemu_version),
        qemu_arch: changed(&p.qemu_arch, &d.qemu_arch),
        qemu_nic: changed(&p.qemu_nic, &d.qemu_nic),
        qemu_options: changed(&p.qemu_options, &d.qemu_options),
        firstmac: changed(&p.firstmac, &d.firstmac),
        timos_line: changed(&p.timos_line, &d.timos_line),
        timos_license: changed(&p.timos_license, &d.timos_license),
        management_address: changed(&p.management_address, &d.management_address),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeState {
    pub id: u32,
    pub running: bool,
    /// Raw status as reported by the platform.
    pub status: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Node;

fn observed(key: &LabChildId, node: WireNode, prior: &NodeSpec) -> Observed<Node> {
    let running = node.is_running();
    let spec = NodeSpec {
        lab_file: Some(key.lab.clone()),
        name: Some(node.name),
        node_type: Some(node.node_type),
        template: Some(node.template),
        image: Some(node.image),
        icon: Some(node.icon),
        top: Some(node.top),
        left: Some(node.left),
        delay: Some(node.delay),
        config: Some(node.config),
        ethernet: Some(node.ethernet),
        serial: Some(node.serial),
        cpu: Some(node.cpu),
        ram: Some(node.ram),
        cpulimit: Some(node.cpulimit),
        uuid: Some(node.uuid),
        qemu_version: Some(node.qemu_version),
        qemu_arch: Some(node.qemu_arch),
        qemu_nic: Some(node.qemu_nic),
        qemu_options: Some(node.qemu_options),
        firstmac: Some(node.firstmac),
        timos_line: Some(node.timos_line),
        timos_license: Some(node.timos_license),
        management_address: Some(node.management_address),
        desired_state: Some(if running {
            PowerState::Started
        } else {
            PowerState::Stopped
        }),
        reboot_on_change: prior.reboot_on_change,
        wipe_on_destroy: prior.wipe_on_destroy,
    };
    let state = NodeState {
        id: key.id,
        running,
        status: node.status,
    };
    (spec, state)
}

async fn power(session: &Session, key: &LabChildId, state: PowerState) -> Result<(), CoreError> {
    debug!(lab = %key.lab, node = key.id, %state, "converging power state");
    session.node_action(&key.lab, key.id, state.action()).await?;
    Ok(())
}

impl Resource for Node {
    const KIND: &'static str = "node";
    type Spec = NodeSpec;
    type State = NodeState;
    type Key = LabChildId;

    fn parse_id(id: &str) -> Option<LabChildId> {
        LabChildId::parse(id, Discriminator::Node)
    }

    fn format_id(key: &LabChildId) -> String {
        key.format(Discriminator::Node)
    }

    async fn create(session: &Session, spec: &NodeSpec) -> Result<(LabChildId, NodeState), CoreError> {
        let lab = normalize_path(required(&spec.lab_file, "lab_file")?);
        let id = session.create_node(&lab, &spec.payload()).await?;
        let key = LabChildId { lab, id };

        // The node exists now; a failed start shows up as drift on the
        // next read instead of orphaning it.
        if spec.desired_state == Some(PowerState::Started) {
            if let Err(e) = power(session, &key, PowerState::Started).await {
                warn!(lab = %key.lab, node = key.id, error = %e, "node created but failed to start");
            }
        }
        Ok((key, NodeState::default()))
    }

    async fn read(
        session: &Session,
        key: &LabChildId,
        prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        let node = session.get_node(&key.lab, key.id).await?;
        Ok(observed(key, node, &prior.spec))
    }

    async fn read_from_list(
        session: &Session,
        key: &LabChildId,
        prior: &Record<Self>,
    ) -> Result<Option<Observed<Self>>, CoreError> {
        let nodes = session.list_nodes(&key.lab).await?;
        Ok(nodes
            .by_id(key.id)
            .cloned()
            .map(|n| observed(key, n, &prior.spec)))
    }

    async fn update(
        session: &Session,
        key: &LabChildId,
        prior: &NodeSpec,
        desired: &NodeSpec,
    ) -> Result<LabChildId, CoreError> {
        let mut payload = diff_payload(prior, desired);
        let attributes_changed = payload != NodePayload::default();
        let reboot = attributes_changed && desired.reboot_on_change == Some(true);

        if reboot {
            power(session, key, PowerState::Stopped).await?;
        }
        if attributes_changed {
            payload.id = Some(key.id);
            session.update_node(&key.lab, key.id, &payload).await?;
        }

        let target = desired.desired_state.or(prior.desired_state);
        if let Some(target) = target {
            let stopped_for_reboot = reboot && target == PowerState::Started;
            if stopped_for_reboot || Some(target) != prior.desired_state {
                power(session, key, target).await?;
            }
        }
        Ok(key.clone())
    }

    async fn delete(session: &Session, key: &LabChildId, spec: &NodeSpec) -> Result<(), CoreError> {
        if spec.wipe_on_destroy == Some(true) {
            if let Err(e) = session.node_action(&key.lab, key.id, NodeAction::Wipe).await {
                warn!(lab = %key.lab, node = key.id, error = %e, "wipe before delete failed");
            }
        }
        session.delete_node(&key.lab, key.id).await?;
        Ok(())
    }

    fn requires_replacement(prior: &NodeSpec, desired: &NodeSpec) -> bool {
        file_differs(&prior.lab_file, &desired.lab_file)
    }

    fn has_changes(prior: &NodeSpec, desired: &NodeSpec) -> bool {
        diff_payload(prior, desired) != NodePayload::default()
            || differs(&prior.desired_state, &desired.desired_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_payload_only_carries_changes() {
        let prior = NodeSpec {
            name: Some("r1".into()),
            ram: Some(1024),
            ..NodeSpec::default()
        };
        let desired = NodeSpec {
            name: Some("r1".into()),
            ram: Some(2048),
            cpu: None,
            ..NodeSpec::default()
        };
        let diff = diff_payload(&prior, &desired);
        assert_eq!(
            diff,
            NodePayload {
                ram: Some(2048),
                ..NodePayload::default()
            }
        );
    }

    #[test]
    fn lifecycle_flags_alone_are_not_changes() {
        let prior = NodeSpec::default();
        let desired = NodeSpec {
            reboot_on_change: Some(true),
            ..NodeSpec::default()
        };
        assert!(!Node::has_changes(&prior, &desired));
    }

    #[test]
    fn power_state_parses_lowercase() {
        assert_eq!("started".parse::<PowerState>().ok(), Some(PowerState::Started));
        assert_eq!(PowerState::Stopped.to_string(), "stopped");
    }
}
