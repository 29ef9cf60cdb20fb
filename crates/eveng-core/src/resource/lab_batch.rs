// ── Batch node power ──
//
// `<lab>:batch_start`, `<lab>:batch_stop`, `<lab>:batch_wipe`. One action
// over a set of nodes (all of them when `node_ids` is unset). Only a
// batch start has a meaningful reverse; deleting it stops the same nodes.

use std::marker::PhantomData;

use eveng_api::Session;
use eveng_api::models::{BatchNodes, NodeAction};
use tracing::debug;

use crate::error::CoreError;
use crate::identity::{Discriminator, decode_marker, encode_marker, normalize_path};
use crate::reconcile::{Observed, Record, Resource, differs};

use super::{file_differs, required};

/// The action a [`LabBatch`] performs.
pub trait BatchAction: Send + Sync + 'static {
    const KIND: &'static str;
    const ACTION: NodeAction;
    const DISCRIMINATOR: Discriminator;
    /// Applied to the same nodes on delete.
    const REVERSE: Option<NodeAction> = None;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartNodes;

impl BatchAction for StartNodes {
    const KIND: &'static str = "lab batch start";
    const ACTION: NodeAction = NodeAction::Start;
    const DISCRIMINATOR: Discriminator = Discriminator::BatchStart;
    const REVERSE: Option<NodeAction> = Some(NodeAction::Stop);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopNodes;

impl BatchAction for StopNodes {
    const KIND: &'static str = "lab batch stop";
    const ACTION: NodeAction = NodeAction::Stop;
    const DISCRIMINATOR: Discriminator = Discriminator::BatchStop;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WipeNodes;

impl BatchAction for WipeNodes {
    const KIND: &'static str = "lab batch wipe";
    const ACTION: NodeAction = NodeAction::Wipe;
    const DISCRIMINATOR: Discriminator = Discriminator::BatchWipe;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSpec {
    pub lab_file: Option<String>,
    pub node_ids: Option<Vec<u32>>,
}

impl BatchSpec {
    fn targets(&self) -> BatchNodes {
        BatchNodes {
            nodes: self.node_ids.clone().unwrap_or_default(),
        }
    }
}

pub struct LabBatch<A>(PhantomData<A>);

impl<A: BatchAction> Resource for LabBatch<A> {
    const KIND: &'static str = A::KIND;
    type Spec = BatchSpec;
    type State = ();
    type Key = String;

    fn parse_id(id: &str) -> Option<String> {
        decode_marker(id, A::DISCRIMINATOR)
    }

    fn format_id(key: &String) -> String {
        encode_marker(key, A::DISCRIMINATOR)
    }

    async fn create(session: &Session, spec: &BatchSpec) -> Result<(String, ()), CoreError> {
        let lab = normalize_path(required(&spec.lab_file, "lab_file")?);
        session.batch_nodes(&lab, A::ACTION, &spec.targets()).await?;
        Ok((lab, ()))
    }

    async fn read(
        session: &Session,
        lab: &String,
        prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        session.get_lab(lab).await?;
        let spec = BatchSpec {
            lab_file: Some(lab.clone()),
            node_ids: prior.spec.node_ids.clone(),
        };
        Ok((spec, ()))
    }

    async fn delete(session: &Session, lab: &String, spec: &BatchSpec) -> Result<(), CoreError> {
        if let Some(reverse) = A::REVERSE {
            session.batch_nodes(lab, reverse, &spec.targets()).await?;
        } else {
            debug!(kind = A::KIND, %lab, "nothing to reverse");
        }
        Ok(())
    }

    fn requires_replacement(prior: &BatchSpec, desired: &BatchSpec) -> bool {
        file_differs(&prior.lab_file, &desired.lab_file) || differs(&prior.node_ids, &desired.node_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_action_has_its_own_identifier() {
        assert_eq!(
            LabBatch::<StartNodes>::format_id(&"/demo.unl".into()),
            "/demo.unl:batch_start"
        );
        assert_eq!(
            LabBatch::<WipeNodes>::parse_id("/demo.unl:batch_wipe").as_deref(),
            Some("/demo.unl")
        );
        assert!(LabBatch::<StopNodes>::parse_id("/demo.unl:batch_start").is_none());
    }

    #[test]
    fn unset_node_ids_target_every_node() {
        assert!(BatchSpec::default().targets().nodes.is_empty());
    }
}
