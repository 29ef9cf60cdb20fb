// EVE-NG wire types
//
// Request payloads skip every `None` field so that only explicitly-set
// attributes reach the server. Response types default liberally and route
// every ambiguously-typed field through `variant`, because single-item and
// list endpoints disagree about scalar types.

use serde::{Deserialize, Serialize};

use crate::variant::{BoolLike, Keyed, de};

// ── Labs ─────────────────────────────────────────────────────────────

/// `POST api/labs` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewLab {
    pub path: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripttimeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<bool>,
}

/// Lab metadata from `GET api/labs<file>`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Lab {
    #[serde(default, deserialize_with = "de::text_like")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: String,
    /// Sent as `"1"` by some releases and `1` by others.
    #[serde(default, deserialize_with = "de::opt_text_like")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "de::int_like")]
    pub scripttimeout: i64,
    /// Sent as `true`/`false` or `1`/`0`.
    #[serde(default, deserialize_with = "de::bool_like")]
    pub lock: bool,
}

/// `POST api/labs<file>/clone` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloneLab {
    pub path: String,
    pub name: String,
}

/// `PUT api/labs<file>/move` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveLab {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `POST api/labs<file>/export` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportLab {
    pub format: String,
    pub configs: bool,
}

/// Export result; both fields are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LabExport {
    #[serde(default)]
    pub export_data: String,
    #[serde(default)]
    pub filename: String,
}

// ── Folders ──────────────────────────────────────────────────────────

/// `POST api/folders` body. `path` is the parent directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFolder {
    pub path: String,
    pub name: String,
}

/// Contents of one folder from `GET api/folders<path>`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FolderListing {
    #[serde(default)]
    pub folders: Vec<FolderEntry>,
    #[serde(default)]
    pub labs: Vec<LabEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FolderEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LabEntry {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub path: String,
}

// ── Networks ─────────────────────────────────────────────────────────

/// Network create/update body. Updates carry `id` and only changed fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

/// A network as returned by the single-item and list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Network {
    #[serde(default, deserialize_with = "de::opt_int_like")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub network_type: String,
    #[serde(default, deserialize_with = "de::int_like")]
    pub top: i64,
    #[serde(default, deserialize_with = "de::int_like")]
    pub left: i64,
    #[serde(default)]
    pub icon: String,
    /// `"1"` from the single read, `1` from the list.
    #[serde(default, deserialize_with = "de::opt_text_like")]
    pub visibility: Option<String>,
    /// Number of attached node interfaces.
    #[serde(default, deserialize_with = "de::int_like")]
    pub count: i64,
}

// ── Nodes ────────────────────────────────────────────────────────────

/// Node create/update body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethernet: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpulimit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qemu_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qemu_arch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qemu_nic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qemu_options: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstmac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timos_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timos_license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_address: Option<String>,
}

/// A node as returned by `GET api/labs<file>/nodes/<id>` or the list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Node {
    #[serde(default, deserialize_with = "de::opt_int_like")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub template: String,
    #[serde(default, deserialize_with = "de::text_like")]
    pub image: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, deserialize_with = "de::int_like")]
    pub top: i64,
    #[serde(default, deserialize_with = "de::int_like")]
    pub left: i64,
    #[serde(default, deserialize_with = "de::int_like")]
    pub delay: i64,
    #[serde(default, deserialize_with = "de::text_like")]
    pub config: String,
    #[serde(default, deserialize_with = "de::int_like")]
    pub ethernet: i64,
    #[serde(default, deserialize_with = "de::int_like")]
    pub serial: i64,
    #[serde(default, deserialize_with = "de::int_like")]
    pub cpu: i64,
    #[serde(default, deserialize_with = "de::int_like")]
    pub ram: i64,
    #[serde(default, deserialize_with = "de::bool_like")]
    pub cpulimit: bool,
    #[serde(default, deserialize_with = "de::text_like")]
    pub uuid: String,
    #[serde(default, deserialize_with = "de::text_like")]
    pub firstmac: String,
    #[serde(default, deserialize_with = "de::text_like")]
    pub qemu_version: String,
    #[serde(default, deserialize_with = "de::text_like")]
    pub qemu_arch: String,
    #[serde(default, deserialize_with = "de::text_like")]
    pub qemu_nic: String,
    #[serde(default, deserialize_with = "de::text_like")]
    pub qemu_options: String,
    #[serde(default, deserialize_with = "de::text_like")]
    pub timos_line: String,
    #[serde(default, deserialize_with = "de::text_like")]
    pub timos_license: String,
    #[serde(default, deserialize_with = "de::text_like")]
    pub management_address: String,
    /// Numeric (`0` stopped, `2` running) or a word, depending on release.
    #[serde(default, deserialize_with = "de::text_like")]
    pub status: String,
}

impl Node {
    /// Whether the platform reports the node as powered on.
    pub fn is_running(&self) -> bool {
        match self.status.trim() {
            "started" | "running" => true,
            other => other.parse::<i64>().is_ok_and(|n| n >= 2),
        }
    }
}

/// `{"id": 3}` or `{"id": [3]}` from a node create.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedId {
    #[serde(default, deserialize_with = "de::id_or_first")]
    pub id: Option<i64>,
}

/// Power and lifecycle actions on nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    Start,
    Stop,
    Wipe,
}

impl NodeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Wipe => "wipe",
        }
    }
}

/// `POST api/labs<file>/nodes/<action>` body. An empty list targets all
/// nodes of the lab.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchNodes {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<u32>,
}

// ── Interfaces ───────────────────────────────────────────────────────

/// Interfaces of one node. Both collections may arrive keyed by index or
/// as arrays.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NodeInterfaces {
    #[serde(default)]
    pub ethernet: Keyed<EthernetInterface>,
    #[serde(default)]
    pub serial: Keyed<SerialInterface>,
    #[serde(default, deserialize_with = "de::opt_int_like")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "de::text_like")]
    pub sort: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EthernetInterface {
    #[serde(default)]
    pub name: String,
    /// `0` when detached.
    #[serde(default, deserialize_with = "de::int_like")]
    pub network_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SerialInterface {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_int_like")]
    pub remote_id: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_int_like")]
    pub remote_if: Option<i64>,
}

/// The value written into `{"<index>": ...}` by an interface update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InterfaceLink {
    /// Attach to a lab network; `0` detaches.
    Network(u32),
    /// Point-to-point link, `"<remote_id>"` or `"<remote_id>:<remote_if>"`.
    Remote(String),
}

impl InterfaceLink {
    pub const DETACHED: Self = Self::Network(0);
}

// ── Users ────────────────────────────────────────────────────────────

/// User create/update body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct User {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, deserialize_with = "de::bool_like")]
    pub enabled: bool,
    /// `-1` (never) is common; kept as text.
    #[serde(default, deserialize_with = "de::text_like")]
    pub expires: String,
}

// ── System ───────────────────────────────────────────────────────────

/// A usage gauge: either a bare percentage or `{"usage": n}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Gauge {
    Plain(f64),
    Nested {
        #[serde(default)]
        usage: f64,
    },
}

impl Gauge {
    pub fn value(&self) -> f64 {
        match self {
            Self::Plain(v) | Self::Nested { usage: v } => *v,
        }
    }
}

/// A feature switch: a bool-like scalar (`"enabled"`, `1`, `true`) or
/// `{"enabled": ...}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Switch {
    Nested { enabled: BoolLike },
    Flat(BoolLike),
}

impl Switch {
    pub fn is_on(&self) -> bool {
        match self {
            Self::Nested { enabled } | Self::Flat(enabled) => enabled.truthy(),
        }
    }
}

/// `GET api/status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SystemStatus {
    #[serde(default, deserialize_with = "de::opt_text_like")]
    pub version: Option<String>,
    #[serde(default)]
    pub cpu: Option<Gauge>,
    #[serde(default, alias = "mem")]
    pub memory: Option<Gauge>,
    #[serde(default)]
    pub disk: Option<Gauge>,
    #[serde(default)]
    pub swap: Option<Gauge>,
    #[serde(default, deserialize_with = "de::int_like")]
    pub running_wrappers: i64,
    #[serde(default)]
    pub ksm: Option<Switch>,
    #[serde(default)]
    pub uksm: Option<Switch>,
    #[serde(default, alias = "cpulimit", deserialize_with = "de::opt_int_like")]
    pub cpu_limit: Option<i64>,
}

// ── Catalog lists ────────────────────────────────────────────────────

/// One entry of `api/list/{templates,networks,icons}`. Most releases send
/// a bare description string; some send an object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CatalogValue {
    Text(String),
    Detail(CatalogDetail),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CatalogDetail {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub defaults: Option<serde_json::Map<String, serde_json::Value>>,
}

pub type Catalog = Keyed<CatalogValue>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_payload_fields_are_omitted() {
        let payload = NetworkPayload {
            id: Some(3),
            name: Some("mgmt".into()),
            ..NetworkPayload::default()
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"id": 3, "name": "mgmt"})
        );
    }

    #[test]
    fn lab_normalizes_version_and_lock() {
        let lab: Lab = serde_json::from_value(json!({
            "name": "demo", "version": 2, "lock": 1, "scripttimeout": "300"
        }))
        .unwrap();
        assert_eq!(lab.version.as_deref(), Some("2"));
        assert!(lab.lock);
        assert_eq!(lab.scripttimeout, 300);
    }

    #[test]
    fn node_status_variants() {
        let running: Node = serde_json::from_value(json!({"status": 2})).unwrap();
        let started: Node = serde_json::from_value(json!({"status": "started"})).unwrap();
        let stopped: Node = serde_json::from_value(json!({"status": 0})).unwrap();
        assert!(running.is_running());
        assert!(started.is_running());
        assert!(!stopped.is_running());
    }

    #[test]
    fn interface_link_serializes_untagged() {
        assert_eq!(serde_json::to_value(InterfaceLink::Network(4)).unwrap(), json!(4));
        assert_eq!(serde_json::to_value(InterfaceLink::DETACHED).unwrap(), json!(0));
        assert_eq!(
            serde_json::to_value(InterfaceLink::Remote("2:1".into())).unwrap(),
            json!("2:1")
        );
    }

    #[test]
    fn status_accepts_flat_and_nested_shapes() {
        let flat: SystemStatus = serde_json::from_value(json!({
            "cpu": 12, "mem": 40.5, "ksm": "enabled", "uksm": "unsupported", "cpulimit": 1
        }))
        .unwrap();
        assert_eq!(flat.cpu.as_ref().map(Gauge::value), Some(12.0));
        assert_eq!(flat.memory.as_ref().map(Gauge::value), Some(40.5));
        assert!(flat.ksm.as_ref().is_some_and(Switch::is_on));
        assert!(!flat.uksm.as_ref().is_some_and(Switch::is_on));
        assert_eq!(flat.cpu_limit, Some(1));

        let nested: SystemStatus = serde_json::from_value(json!({
            "cpu": {"usage": 3.5}, "ksm": {"enabled": true}, "cpu_limit": 0
        }))
        .unwrap();
        assert_eq!(nested.cpu.as_ref().map(Gauge::value), Some(3.5));
        assert!(nested.ksm.as_ref().is_some_and(Switch::is_on));
        assert_eq!(nested.cpu_limit, Some(0));
    }

    #[test]
    fn catalog_accepts_strings_and_objects() {
        let catalog: Catalog = serde_json::from_value(json!({
            "vpcs": "Virtual PC (VPCS)",
            "vios": {"type": "qemu", "description": "Cisco vIOS"}
        }))
        .unwrap();
        assert!(matches!(catalog.get("vpcs"), Some(CatalogValue::Text(_))));
        match catalog.get("vios") {
            Some(CatalogValue::Detail(d)) => assert_eq!(d.kind.as_deref(), Some("qemu")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
