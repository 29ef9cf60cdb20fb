// ── Catalog queries ──
//
// Read-only lookups: node templates, network types, icons and the server
// status. Catalog entries come back ordered by name.

use std::collections::BTreeMap;

use eveng_api::Session;
use eveng_api::models::{Catalog, CatalogValue, Gauge, Switch, SystemStatus};
use serde_json::Value;

use crate::error::CoreError;

/// One entry of a platform catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogEntry {
    /// Catalog key: template name, network type or icon file.
    pub name: String,
    pub kind: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub filename: String,
    /// Template defaults, rendered as text.
    pub defaults: BTreeMap<String, String>,
}

impl CatalogEntry {
    fn new(name: &str, value: &CatalogValue) -> Self {
        match value {
            CatalogValue::Text(description) => Self {
                name: name.to_owned(),
                description: description.clone(),
                ..Self::default()
            },
            CatalogValue::Detail(detail) => Self {
                name: name.to_owned(),
                kind: detail.kind.clone().unwrap_or_default(),
                description: detail.description.clone().unwrap_or_default(),
                icon: detail.icon.clone().unwrap_or_default(),
                category: detail.category.clone().unwrap_or_default(),
                filename: detail.filename.clone().unwrap_or_default(),
                defaults: detail
                    .defaults
                    .iter()
                    .flatten()
                    .map(|(k, v)| (k.clone(), render(v)))
                    .collect(),
            },
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn entries(catalog: &Catalog) -> Vec<CatalogEntry> {
    // Keyed iterates in key order.
    catalog
        .iter()
        .map(|(name, value)| CatalogEntry::new(name, value))
        .collect()
}

pub async fn templates(session: &Session) -> Result<Vec<CatalogEntry>, CoreError> {
    Ok(entries(&session.list_templates().await?))
}

pub async fn network_types(session: &Session) -> Result<Vec<CatalogEntry>, CoreError> {
    Ok(entries(&session.list_network_types().await?))
}

pub async fn icons(session: &Session) -> Result<Vec<CatalogEntry>, CoreError> {
    Ok(entries(&session.list_icons().await?))
}

/// Server health and host-wide toggles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    pub version: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub swap_usage: f64,
    pub running_wrappers: i64,
    pub ksm_enabled: bool,
    pub uksm_enabled: bool,
    pub cpu_limit: i64,
}

impl From<SystemStatus> for StatusSnapshot {
    fn from(status: SystemStatus) -> Self {
        let usage = |g: &Option<Gauge>| g.as_ref().map_or(0.0, Gauge::value);
        let on = |s: &Option<Switch>| s.as_ref().is_some_and(Switch::is_on);
        Self {
            version: status.version.unwrap_or_default(),
            cpu_usage: usage(&status.cpu),
            memory_usage: usage(&status.memory),
            disk_usage: usage(&status.disk),
            swap_usage: usage(&status.swap),
            running_wrappers: status.running_wrappers,
            ksm_enabled: on(&status.ksm),
            uksm_enabled: on(&status.uksm),
            cpu_limit: status.cpu_limit.unwrap_or_default(),
        }
    }
}

pub async fn status(session: &Session) -> Result<StatusSnapshot, CoreError> {
    Ok(session.status().await?.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn entries_accept_both_value_shapes() {
        let catalog: Catalog = serde_json::from_value(json!({
            "vpcs": "Virtual PC",
            "iol": {"type": "iol", "description": "Cisco IOL", "defaults": {"ram": 1024, "nvram": "1024"}}
        }))
        .unwrap();

        let list = entries(&catalog);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "iol");
        assert_eq!(list[0].kind, "iol");
        assert_eq!(list[0].defaults.get("ram").map(String::as_str), Some("1024"));
        assert_eq!(list[0].defaults.get("nvram").map(String::as_str), Some("1024"));
        assert_eq!(
            list[1],
            CatalogEntry {
                name: "vpcs".into(),
                description: "Virtual PC".into(),
                ..CatalogEntry::default()
            }
        );
    }

    #[test]
    fn snapshot_flattens_status() {
        let status: SystemStatus = serde_json::from_value(json!({
            "version": "6.2.0-4",
            "cpu": 12.5,
            "mem": {"usage": 40},
            "ksm": {"enabled": true},
            "uksm": "unsupported",
            "cpulimit": 1,
            "running_wrappers": "3"
        }))
        .unwrap();
        let snapshot = StatusSnapshot::from(status);
        assert_eq!(snapshot.version, "6.2.0-4");
        assert_eq!(snapshot.cpu_usage, 12.5);
        assert_eq!(snapshot.memory_usage, 40.0);
        assert_eq!(snapshot.disk_usage, 0.0);
        assert!(snapshot.ksm_enabled);
        assert!(!snapshot.uksm_enabled);
        assert_eq!(snapshot.cpu_limit, 1);
        assert_eq!(snapshot.running_wrappers, 3);
    }
}
