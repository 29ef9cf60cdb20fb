// ── Lab monitoring ──
//
// `<lab>:monitoring`. A read-only summary of a lab: how many nodes and
// networks it has and how many nodes are running. The thresholds are kept
// locally for whatever consumes the summary; nothing is pushed to the
// platform.

use eveng_api::Session;
use tracing::debug;

use crate::error::CoreError;
use crate::identity::{Discriminator, decode_marker, encode_marker, normalize_path};
use crate::reconcile::{Observed, Record, Resource, differs};

use super::{file_differs, required};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitoringSpec {
    pub lab_file: Option<String>,
    /// Count nodes. Defaults to `true`.
    pub monitor_nodes: Option<bool>,
    /// Count networks. Defaults to `true`.
    pub monitor_networks: Option<bool>,
    /// Percent; defaults to 80.
    pub alert_threshold_cpu: Option<f64>,
    /// Percent; defaults to 90.
    pub alert_threshold_memory: Option<f64>,
}

impl MonitoringSpec {
    fn with_defaults(&self, lab: &str) -> Self {
        Self {
            lab_file: Some(lab.to_owned()),
            monitor_nodes: Some(self.monitor_nodes.unwrap_or(true)),
            monitor_networks: Some(self.monitor_networks.unwrap_or(true)),
            alert_threshold_cpu: Some(self.alert_threshold_cpu.unwrap_or(80.0)),
            alert_threshold_memory: Some(self.alert_threshold_memory.unwrap_or(90.0)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitoringState {
    pub monitoring_enabled: bool,
    pub node_count: usize,
    pub network_count: usize,
    pub running_nodes: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabMonitoring;

async fn summarize(session: &Session, lab: &str, spec: &MonitoringSpec) -> Result<MonitoringState, CoreError> {
    session.get_lab(lab).await?;

    let mut state = MonitoringState {
        monitoring_enabled: true,
        ..MonitoringState::default()
    };
    if spec.monitor_nodes != Some(false) {
        let nodes = session.list_nodes(lab).await?;
        state.node_count = nodes.len();
        state.running_nodes = nodes.values().filter(|n| n.is_running()).count();
    }
    if spec.monitor_networks != Some(false) {
        state.network_count = session.list_networks(lab).await?.len();
    }
    debug!(lab, ?state, "lab summary");
    Ok(state)
}

impl Resource for LabMonitoring {
    const KIND: &'static str = "lab monitoring";
    type Spec = MonitoringSpec;
    type State = MonitoringState;
    type Key = String;

    fn parse_id(id: &str) -> Option<String> {
        decode_marker(id, Discriminator::Monitoring)
    }

    fn format_id(key: &String) -> String {
        encode_marker(key, Discriminator::Monitoring)
    }

    async fn create(session: &Session, spec: &MonitoringSpec) -> Result<(String, MonitoringState), CoreError> {
        let lab = normalize_path(required(&spec.lab_file, "lab_file")?);
        let state = summarize(session, &lab, spec).await?;
        Ok((lab, state))
    }

    async fn read(
        session: &Session,
        lab: &String,
        prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        let spec = prior.spec.with_defaults(lab);
        let state = summarize(session, lab, &spec).await?;
        Ok((spec, state))
    }

    async fn delete(_session: &Session, _lab: &String, _spec: &MonitoringSpec) -> Result<(), CoreError> {
        Ok(())
    }

    fn requires_replacement(prior: &MonitoringSpec, desired: &MonitoringSpec) -> bool {
        file_differs(&prior.lab_file, &desired.lab_file)
    }

    fn has_changes(prior: &MonitoringSpec, desired: &MonitoringSpec) -> bool {
        differs(&prior.monitor_nodes, &desired.monitor_nodes)
            || differs(&prior.monitor_networks, &desired.monitor_networks)
            || differs(&prior.alert_threshold_cpu, &desired.alert_threshold_cpu)
            || differs(&prior.alert_threshold_memory, &desired.alert_threshold_memory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_unset_settings() {
        let spec = MonitoringSpec {
            monitor_networks: Some(false),
            ..MonitoringSpec::default()
        }
        .with_defaults("/demo.unl");
        assert_eq!(spec.lab_file.as_deref(), Some("/demo.unl"));
        assert_eq!(spec.monitor_nodes, Some(true));
        assert_eq!(spec.monitor_networks, Some(false));
        assert_eq!(spec.alert_threshold_cpu, Some(80.0));
        assert_eq!(spec.alert_threshold_memory, Some(90.0));
    }
}
