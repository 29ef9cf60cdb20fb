// ── Resource identity ──
//
// Composite identifiers (`<parent>:<discriminator>:<n>`), marker
// identifiers (`<parent>:<discriminator>`), and the path rules that turn a
// folder plus a name into a lab file. Identifiers only exist as strings at
// the record boundary; handlers work with the parsed structs below.

use std::fmt;

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

// ── Discriminator ───────────────────────────────────────────────────

/// The middle token of a composite identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Discriminator {
    Network,
    Node,
    Ifattach,
    Export,
    Lock,
    Clone,
    Move,
    Monitoring,
    BatchStart,
    BatchStop,
    BatchWipe,
}

// ── Codec ───────────────────────────────────────────────────────────

/// `parent:disc:n`
pub fn encode(parent: &str, disc: Discriminator, n: u64) -> String {
    format!("{parent}:{disc}:{n}")
}

/// `parent:disc`
pub fn encode_marker(parent: &str, disc: Discriminator) -> String {
    format!("{parent}:{disc}")
}

/// Split `id` around the single occurrence of `:disc:`.
fn split_once_exact<'a>(id: &'a str, disc: Discriminator) -> Option<(&'a str, &'a str)> {
    let sep = format!(":{disc}:");
    let (parent, tail) = id.split_once(sep.as_str())?;
    if tail.contains(sep.as_str()) {
        return None;
    }
    Some((parent, tail))
}

/// Inverse of [`encode`].
///
/// `None` unless `:disc:` occurs exactly once and everything after it is an
/// unsigned integer. Callers treat `None` as a stale or foreign identifier.
pub fn decode(id: &str, disc: Discriminator) -> Option<(String, u64)> {
    let (parent, tail) = split_once_exact(id, disc)?;
    let n = tail.parse::<u64>().ok()?;
    Some((parent.to_owned(), n))
}

/// Inverse of [`encode_marker`]: the parent, if `id` ends in `:disc`.
pub fn decode_marker(id: &str, disc: Discriminator) -> Option<String> {
    let parent = id.strip_suffix(disc.as_ref())?.strip_suffix(':')?;
    (!parent.is_empty()).then(|| parent.to_owned())
}

// ── Typed identifiers ───────────────────────────────────────────────

/// An object living inside a lab, addressed by a numeric id
/// (`/demo.unl:network:3`, `/demo.unl:node:1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabChildId {
    pub lab: String,
    pub id: u32,
}

impl LabChildId {
    pub fn parse(id: &str, disc: Discriminator) -> Option<Self> {
        let (lab, n) = decode(id, disc)?;
        Some(Self {
            lab,
            id: u32::try_from(n).ok()?,
        })
    }

    pub fn format(&self, disc: Discriminator) -> String {
        encode(&self.lab, disc, u64::from(self.id))
    }
}

/// One interface of one node: `/demo.unl:ifattach:<node>:<index>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceId {
    pub lab: String,
    pub node: u32,
    pub index: u32,
}

impl InterfaceId {
    pub fn parse(id: &str) -> Option<Self> {
        let (lab, tail) = split_once_exact(id, Discriminator::Ifattach)?;
        let (node, index) = tail.split_once(':')?;
        Some(Self {
            lab: lab.to_owned(),
            node: node.parse().ok()?,
            index: index.parse().ok()?,
        })
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.lab,
            Discriminator::Ifattach,
            self.node,
            self.index
        )
    }
}

/// A lab export: `/demo.unl:export:<format>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportId {
    pub lab: String,
    pub format: String,
}

impl ExportId {
    pub fn parse(id: &str) -> Option<Self> {
        let (lab, format) = split_once_exact(id, Discriminator::Export)?;
        if format.is_empty() || format.contains(':') {
            return None;
        }
        Some(Self {
            lab: lab.to_owned(),
            format: format.to_owned(),
        })
    }
}

impl fmt::Display for ExportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.lab, Discriminator::Export, self.format)
    }
}

// ── Path rules ──────────────────────────────────────────────────────

/// A leading `/` on every path except the root; empty means root.
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        "/".into()
    } else if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

/// Directory form of a path: normalized, with a trailing `/`.
pub fn directory(path: &str) -> String {
    let mut dir = normalize_path(path);
    if !dir.ends_with('/') {
        dir.push('/');
    }
    dir
}

/// Full path of a child entry: `directory(parent) + name`.
pub fn child_path(parent: &str, name: &str) -> String {
    format!("{}{name}", directory(parent))
}

/// The lab file for `name` in folder `path`: `/` + `demo` is `/demo.unl`.
pub fn lab_file(path: &str, name: &str) -> String {
    format!("{}{name}.unl", directory(path))
}

/// Split a full path into its parent directory (no trailing `/` except the
/// root) and last segment.
pub fn split_path(full: &str) -> (String, String) {
    let trimmed = full.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, name)) => (format!("/{parent}"), name.to_owned()),
        None => ("/".into(), trimmed.to_owned()),
    }
}

/// Split a lab file into its folder and its name without `.unl`.
pub fn split_lab_file(file: &str) -> (String, String) {
    let (parent, name) = split_path(file);
    let name = name.strip_suffix(".unl").unwrap_or(&name).to_owned();
    (parent, name)
}
