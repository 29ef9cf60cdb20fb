// ── Network ──
//
// `<lab>:network:<id>`. The single-network endpoint is unreliable on some
// platform releases, so reads fall back to the lab's network listing.

use eveng_api::Session;
use eveng_api::models::{Network as WireNetwork, NetworkPayload};
use tracing::debug;

use crate::error::CoreError;
use crate::identity::{Discriminator, LabChildId, normalize_path};
use crate::reconcile::{Observed, Record, Resource, changed, differs};

use super::{file_differs, required};

/// Visibility the platform assumes when none is reported.
const DEFAULT_VISIBILITY: &str = "1";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkSpec {
    pub lab_file: Option<String>,
    pub name: Option<String>,
    /// `bridge`, `ovs`, `pnet0`...
    pub network_type: Option<String>,
    pub top: Option<i64>,
    pub left: Option<i64>,
    pub icon: Option<String>,
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkState {
    pub id: u32,
    /// Node interfaces attached to this network.
    pub node_count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Network;

fn observed(key: &LabChildId, network: WireNetwork) -> Observed<Network> {
    let spec = NetworkSpec {
        lab_file: Some(key.lab.clone()),
        name: Some(network.name),
        network_type: Some(network.network_type),
        top: Some(network.top),
        left: Some(network.left),
        icon: Some(network.icon),
        visibility: Some(
            network
                .visibility
                .unwrap_or_else(|| DEFAULT_VISIBILITY.to_owned()),
        ),
    };
    let state = NetworkState {
        id: key.id,
        node_count: network.count,
    };
    (spec, state)
}

impl Resource for Network {
    const KIND: &'static str = "network";
    type Spec = NetworkSpec;
    type State = NetworkState;
    type Key = LabChildId;

    fn parse_id(id: &str) -> Option<LabChildId> {
        LabChildId::parse(id, Discriminator::Network)
    }

    fn format_id(key: &LabChildId) -> String {
        key.format(Discriminator::Network)
    }

    async fn create(
        session: &Session,
        spec: &NetworkSpec,
    ) -> Result<(LabChildId, NetworkState), CoreError> {
        let lab = normalize_path(required(&spec.lab_file, "lab_file")?);
        let payload = NetworkPayload {
            id: None,
            name: spec.name.clone(),
            network_type: spec.network_type.clone(),
            top: spec.top,
            left: spec.left,
            icon: spec.icon.clone(),
            visibility: spec.visibility.clone(),
        };
        let id = session.create_network(&lab, &payload).await?;
        Ok((LabChildId { lab, id }, NetworkState::default()))
    }

    async fn read(
        session: &Session,
        key: &LabChildId,
        _prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        let network = session.get_network(&key.lab, key.id).await?;
        Ok(observed(key, network))
    }

    async fn read_from_list(
        session: &Session,
        key: &LabChildId,
        _prior: &Record<Self>,
    ) -> Result<Option<Observed<Self>>, CoreError> {
        let networks = session.list_networks(&key.lab).await?;
        let found = networks.by_id(key.id).cloned();
        debug!(lab = %key.lab, id = key.id, found = found.is_some(), "network list lookup");
        Ok(found.map(|n| observed(key, n)))
    }

    /// Sends `id` plus only the attributes that changed.
    async fn update(
        session: &Session,
        key: &LabChildId,
        prior: &NetworkSpec,
        desired: &NetworkSpec,
    ) -> Result<LabChildId, CoreError> {
        let payload = NetworkPayload {
            id: Some(key.id),
            name: changed(&prior.name, &desired.name),
            network_type: changed(&prior.network_type, &desired.network_type),
            top: changed(&prior.top, &desired.top),
            left: changed(&prior.left, &desired.left),
            icon: changed(&prior.icon, &desired.icon),
            visibility: changed(&prior.visibility, &desired.visibility),
        };
        session.update_network(&key.lab, key.id, &payload).await?;
        Ok(key.clone())
    }

    async fn delete(session: &Session, key: &LabChildId, _spec: &NetworkSpec) -> Result<(), CoreError> {
        session.delete_network(&key.lab, key.id).await?;
        Ok(())
    }

    fn requires_replacement(prior: &NetworkSpec, desired: &NetworkSpec) -> bool {
        file_differs(&prior.lab_file, &desired.lab_file)
    }

    fn has_changes(prior: &NetworkSpec, desired: &NetworkSpec) -> bool {
        differs(&prior.name, &desired.name)
            || differs(&prior.network_type, &desired.network_type)
            || differs(&prior.top, &desired.top)
            || differs(&prior.left, &desired.left)
            || differs(&prior.icon, &desired.icon)
            || differs(&prior.visibility, &desired.visibility)
    }
}
