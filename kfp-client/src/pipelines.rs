//! Pipeline-related API endpoints

use crate::KfpClient;
use crate::error::{ClientError, Result};
use kfp_core::domain::pipeline::{PipelineRef, find_by_display_name};
use kfp_core::dto::pipeline::ListPipelinesResponse;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Page size requested from the listing endpoint
const PAGE_SIZE: u32 = 100;

impl KfpClient {
    // =============================================================================
    // Pipeline Listing
    // =============================================================================

    /// Fetch a single page of pipelines
    ///
    /// # Arguments
    /// * `page_token` - Token from the previous page, `None` for the first page
    pub async fn list_pipelines_page(
        &self,
        page_token: Option<&str>,
    ) -> Result<ListPipelinesResponse> {
        let mut request = self.get("pipelines").query(&[("page_size", PAGE_SIZE)]);
        if let Some(token) = page_token {
            request = request.query(&[("page_token", token)]);
        }

        let response = request.send().await?;
        self.handle_response("list pipelines", response).await
    }

    /// List all pipelines, following pagination
    ///
    /// # Returns
    /// Every pipeline, in the order the service returned them
    pub async fn list_pipelines(&self) -> Result<Vec<PipelineRef>> {
        let mut pipelines = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let page = self.list_pipelines_page(page_token.as_deref()).await?;
            let next = next_token(&mut seen, page.next_page());
            pipelines.extend(page.pipelines.into_iter().map(PipelineRef::from));

            match next {
                Some(token) => page_token = Some(token),
                None => return Ok(pipelines),
            }
        }
    }

    /// Resolve a pipeline display name to its id
    ///
    /// Pages are scanned in order and the scan stops at the first exact,
    /// case-sensitive match. When several pipelines share the name, the one
    /// the service lists first wins.
    ///
    /// # Errors
    /// [`ClientError::NotFound`] when no pipeline has this display name.
    pub async fn locate_pipeline(&self, display_name: &str) -> Result<String> {
        let mut page_token: Option<String> = None;
        let mut seen = HashSet::new();
        let mut scanned = 0usize;

        loop {
            let page = self.list_pipelines_page(page_token.as_deref()).await?;
            let next = next_token(&mut seen, page.next_page());
            let refs: Vec<PipelineRef> = page.pipelines.into_iter().map(PipelineRef::from).collect();
            scanned += refs.len();

            if let Some(found) = find_by_display_name(&refs, display_name) {
                info!("Located pipeline '{}' with id {}", display_name, found.id);
                return Ok(found.id.clone());
            }

            match next {
                Some(token) => {
                    debug!("Pipeline '{}' not on this page, fetching next", display_name);
                    page_token = Some(token);
                }
                None => {
                    debug!("Scanned {} pipeline(s) without a match", scanned);
                    return Err(ClientError::NotFound(display_name.to_string()));
                }
            }
        }
    }
}

/// Token of the page to fetch next, or `None` to stop
///
/// A token handed out twice would cycle forever, so it ends the listing.
fn next_token(seen: &mut HashSet<String>, next: Option<&str>) -> Option<String> {
    let token = next?;
    if !seen.insert(token.to_string()) {
        warn!("Pipeline listing repeated page token '{}', stopping", token);
        return None;
    }
    Some(token.to_string())
}
