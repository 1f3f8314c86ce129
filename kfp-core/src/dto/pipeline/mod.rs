//! Pipeline DTOs

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::PipelineRef;

/// One page of `GET /apis/v2beta1/pipelines`
///
/// The service omits `pipelines` entirely when a page is empty, and omits or
/// blanks `next_page_token` on the last page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPipelinesResponse {
    #[serde(default)]
    pub pipelines: Vec<PipelineEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u64>,
}

impl ListPipelinesResponse {
    /// Token for the following page, if there is one
    pub fn next_page(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Pipeline entry inside a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEntry {
    pub pipeline_id: String,
    pub display_name: String,
}

impl From<PipelineEntry> for PipelineRef {
    fn from(entry: PipelineEntry) -> Self {
        PipelineRef {
            id: entry.pipeline_id,
            display_name: entry.display_name,
        }
    }
}
