// ── Lab export ──
//
// `<lab>:export:<format>`. The exported payload only comes back from the
// export call itself, so reads verify the lab and keep the prior payload.

use eveng_api::Session;
use eveng_api::models::ExportLab;

use crate::error::CoreError;
use crate::identity::{ExportId, normalize_path};
use crate::reconcile::{Observed, Record, Resource, differs};

use super::{file_differs, required};

const DEFAULT_FORMAT: &str = "unl";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSpec {
    pub lab_file: Option<String>,
    /// Defaults to `unl`.
    pub export_format: Option<String>,
    /// Defaults to `true`.
    pub include_configs: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportState {
    pub export_data: String,
    pub export_filename: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabExport;

impl Resource for LabExport {
    const KIND: &'static str = "lab export";
    type Spec = ExportSpec;
    type State = ExportState;
    type Key = ExportId;

    fn parse_id(id: &str) -> Option<ExportId> {
        ExportId::parse(id)
    }

    fn format_id(key: &ExportId) -> String {
        key.to_string()
    }

    async fn create(session: &Session, spec: &ExportSpec) -> Result<(ExportId, ExportState), CoreError> {
        let lab = normalize_path(required(&spec.lab_file, "lab_file")?);
        let format = spec
            .export_format
            .clone()
            .unwrap_or_else(|| DEFAULT_FORMAT.to_owned());
        let request = ExportLab {
            format: format.clone(),
            configs: spec.include_configs.unwrap_or(true),
        };

        let export = session.export_lab(&lab, &request).await?;
        let state = ExportState {
            export_data: export.export_data,
            export_filename: export.filename,
        };
        Ok((ExportId { lab, format }, state))
    }

    async fn read(
        session: &Session,
        key: &ExportId,
        prior: &Record<Self>,
    ) -> Result<Observed<Self>, CoreError> {
        session.get_lab(&key.lab).await?;
        let spec = ExportSpec {
            lab_file: Some(key.lab.clone()),
            export_format: Some(key.format.clone()),
            include_configs: Some(prior.spec.include_configs.unwrap_or(true)),
        };
        Ok((spec, prior.state.clone()))
    }

    async fn delete(_session: &Session, _key: &ExportId, _spec: &ExportSpec) -> Result<(), CoreError> {
        Ok(())
    }

    fn requires_replacement(prior: &ExportSpec, desired: &ExportSpec) -> bool {
        file_differs(&prior.lab_file, &desired.lab_file)
            || differs(&prior.export_format, &desired.export_format)
            || differs(&prior.include_configs, &desired.include_configs)
    }
}
