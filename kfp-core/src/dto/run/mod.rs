//! Run DTOs

use serde::{Deserialize, Serialize};

use crate::params::ParameterSet;

/// Body of `POST /apis/v2beta1/runs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRun {
    pub display_name: String,
    pub pipeline_version_reference: PipelineVersionReference,
    pub runtime_config: RuntimeConfig,
}

impl CreateRun {
    pub fn new(
        pipeline_id: impl Into<String>,
        display_name: impl Into<String>,
        parameters: ParameterSet,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            pipeline_version_reference: PipelineVersionReference {
                pipeline_id: pipeline_id.into(),
            },
            runtime_config: RuntimeConfig { parameters },
        }
    }
}

/// Which pipeline the run is created from
///
/// Only the pipeline id is sent, so the service picks the pipeline's
/// default version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineVersionReference {
    pub pipeline_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub parameters: ParameterSet,
}
