// ── System config ──
//
// Host-wide toggles. There is exactly one instance per server, so the
// identifier is the constant `system_config` and delete only forgets it.

use eveng_api::Session;
use eveng_api::models::Switch;
use tracing::debug;

use crate::error::CoreError;
use crate::reconcile::{Observed, Record, Resource, differs};

const ID: &str = "system_config";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemConfigSpec {
    pub cpu_limit: Option<i64>,
    pub ksm_enabled: Option<bool>,
    pub uksm_enabled: Option<bool>,
}

/// The singleton key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemConfigKey;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemConfig;

/// POST whichever toggles `desired` sets and `prior` does not already hold.
async fn push(session: &Session, prior: &SystemConfigSpec, desired: &SystemConfigSpec) -> Result<(), CoreError> {
    if let Some(limit) = desired.cpu_limit.filter(|_| differs(&prior.cpu_limit, &desired.cpu_limit)) {
        session.set_cpu_limit(limit).await?;
    }
    if let Some(on) = desired.ksm_enabled.filter(|_| differs(&prior.ksm_enabled, &desired.ksm_enabled)) {
        session.set_ksm(on).await?;
    }
    if let Some(on) = desired.uksm_enabled.filter(|_| differs(&prior.uksm_enabled, &desired.uksm_enabled)) {
        session.set_uksm(on).await?;
    }
    Ok(())
}

impl Resource for SystemConfig {
    const KIND: &'static str = "system config";
    type Spec = SystemConfigSpec;
    type State = ();
    type Key = SystemConfigKey;

    fn parse_id(id: &str) -> Option<SystemConfigKey> {
        (id == ID).then_some(SystemConfigKey)
    }

    fn format_id(_key: &SystemConfigKey) -> String {
        ID.to_owned()
    }

    async fn create(session: &Session, spec: &SystemConfigSpec) -> Result<(SystemConfigKey, ()), CoreError> {
        push(session, &SystemConfigSpec::default(), spec).await?;
        Ok((SystemConfigKey, ()))
    }

    async fn read(
        session: &Session,
        _key: &SystemConfigKey,
        prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        let status = session.status().await?;
        let spec = SystemConfigSpec {
            cpu_limit: status.cpu_limit.or(prior.spec.cpu_limit),
            ksm_enabled: Some(status.ksm.as_ref().is_some_and(Switch::is_on)),
            uksm_enabled: Some(status.uksm.as_ref().is_some_and(Switch::is_on)),
        };
        Ok((spec, ()))
    }

    async fn update(
        session: &Session,
        key: &SystemConfigKey,
        prior: &SystemConfigSpec,
        desired: &SystemConfigSpec,
    ) -> Result<SystemConfigKey, CoreError> {
        push(session, prior, desired).await?;
        Ok(*key)
    }

    async fn delete(_session: &Session, _key: &SystemConfigKey, _spec: &SystemConfigSpec) -> Result<(), CoreError> {
        debug!("system settings stay as they are; forgetting the record");
        Ok(())
    }

    fn requires_replacement(_prior: &SystemConfigSpec, _desired: &SystemConfigSpec) -> bool {
        false
    }

    fn has_changes(prior: &SystemConfigSpec, desired: &SystemConfigSpec) -> bool {
        differs(&prior.cpu_limit, &desired.cpu_limit)
            || differs(&prior.ksm_enabled, &desired.ksm_enabled)
            || differs(&prior.uksm_enabled, &desired.uksm_enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_identifier() {
        assert_eq!(SystemConfig::parse_id("system_config"), Some(SystemConfigKey));
        assert_eq!(SystemConfig::parse_id("/demo.unl"), None);
        assert_eq!(SystemConfig::format_id(&SystemConfigKey), "system_config");
    }

    #[test]
    fn unset_toggles_are_not_changes() {
        let prior = SystemConfigSpec {
            cpu_limit: Some(1),
            ksm_enabled: Some(true),
            uksm_enabled: Some(false),
        };
        let desired = SystemConfigSpec {
            ksm_enabled: Some(true),
            ..SystemConfigSpec::default()
        };
        assert!(!SystemConfig::has_changes(&prior, &desired));
    }
}
