// ── Lab lock ──

use eveng_api::Session;

use crate::error::CoreError;
use crate::identity::{Discriminator, decode_marker, encode_marker, normalize_path};
use crate::reconcile::{Observed, Record, Resource};

use super::{file_differs, required};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockSpec {
    pub lab_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockState {
    /// Lock flag as the platform reports it.
    pub locked: bool,
}

/// Holds a lab locked for as long as the record exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabLock;

impl Resource for LabLock {
    const KIND: &'static str = "lab lock";
    type Spec = LockSpec;
    type State = LockState;
    type Key = String;

    fn parse_id(id: &str) -> Option<String> {
        decode_marker(id, Discriminator::Lock)
    }

    fn format_id(key: &String) -> String {
        encode_marker(key, Discriminator::Lock)
    }

    async fn create(session: &Session, spec: &LockSpec) -> Result<(String, LockState), CoreError> {
        let lab = normalize_path(required(&spec.lab_file, "lab_file")?);
        session.lock_lab(&lab).await?;
        Ok((lab, LockState::default()))
    }

    /// An unlocked lab means the lock is gone, so the record drifts.
    async fn read(
        session: &Session,
        lab: &String,
        _prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        let meta = session.get_lab(lab).await?;
        if !meta.lock {
            return Err(CoreError::NotFound {
                kind: Self::KIND,
                id: lab.clone(),
            });
        }
        let spec = LockSpec {
            lab_file: Some(lab.clone()),
        };
        Ok((spec, LockState { locked: meta.lock }))
    }

    /// Releases the lock.
    async fn delete(session: &Session, lab: &String, _spec: &LockSpec) -> Result<(), CoreError> {
        session.unlock_lab(lab).await?;
        Ok(())
    }

    fn requires_replacement(prior: &LockSpec, desired: &LockSpec) -> bool {
        file_differs(&prior.lab_file, &desired.lab_file)
    }
}
