// eveng-core: Desired-state reconciliation on top of eveng-api.

pub mod catalog;
pub mod connector;
pub mod error;
pub mod identity;
pub mod reconcile;
pub mod resource;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{CatalogEntry, StatusSnapshot};
pub use connector::Connector;
pub use error::CoreError;
pub use reconcile::{Applied, Reconciler, Record, Resource};

// Callers configure sessions without depending on eveng-api directly.
pub use eveng_api::{Session, SessionConfig};
