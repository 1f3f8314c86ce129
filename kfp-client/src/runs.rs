//! Run-related API endpoints

use crate::KfpClient;
use crate::error::{ClientError, Result};
use kfp_core::ParameterSet;
use kfp_core::domain::run::{RunHandle, RunSnapshot, RunStatus};
use kfp_core::dto::run::CreateRun;
use serde_json::Value;
use tracing::{debug, info};

impl KfpClient {
    // =============================================================================
    // Run Lifecycle
    // =============================================================================

    /// Trigger a run of a pipeline
    ///
    /// # Arguments
    /// * `pipeline_id` - Id of the pipeline; its default version is run
    /// * `display_name` - Display name given to the new run
    /// * `parameters` - Runtime parameters, sent as-is
    ///
    /// # Returns
    /// A handle carrying the new run id
    pub async fn trigger_run(
        &self,
        pipeline_id: &str,
        display_name: &str,
        parameters: ParameterSet,
    ) -> Result<RunHandle> {
        self.create_run(&CreateRun::new(pipeline_id, display_name, parameters))
            .await
    }

    /// Submit a prepared run request
    ///
    /// # Errors
    /// [`ClientError::MalformedResponse`] if the response has no string `run_id`.
    pub async fn create_run(&self, req: &CreateRun) -> Result<RunHandle> {
        debug!(
            "Creating run '{}' of pipeline {} with {} parameter(s)",
            req.display_name,
            req.pipeline_version_reference.pipeline_id,
            req.runtime_config.parameters.len()
        );

        let response = self.post("runs").json(req).send().await?;
        let body: Value = self.handle_response("create run", response).await?;

        let run_id = body
            .get("run_id")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::malformed("create run", "run_id"))?;

        info!("Created run {} ('{}')", run_id, req.display_name);
        Ok(RunHandle::new(run_id))
    }

    /// Get the current state of a run
    ///
    /// # Errors
    /// [`ClientError::MalformedResponse`] if the response has no string `state`.
    /// A missing state is never read as "still running".
    pub async fn get_run(&self, run_id: &str) -> Result<RunSnapshot> {
        let response = self.get_item("runs", run_id)?.send().await?;
        let body: Value = self.handle_response("get run", response).await?;

        let state = body
            .get("state")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::malformed("get run", "state"))?;

        Ok(RunSnapshot::from_response(RunStatus::from_state(state), &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_trigger_run_payload_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/apis/v2beta1/runs"))
            .and(header("Authorization", "Bearer test-token"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({
                "display_name": "run1",
                "pipeline_version_reference": { "pipeline_id": "p1" },
                "runtime_config": { "parameters": { "epochs": 3 } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "run_id": "r-42",
                "state": "PENDING"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = KfpClient::new(server.uri(), "test-token");
        let mut parameters = ParameterSet::new();
        parameters.insert("epochs", json!(3));

        let handle = client.trigger_run("p1", "run1", parameters).await.unwrap();
        assert_eq!(handle, RunHandle::new("r-42"));
    }

    #[tokio::test]
    async fn test_trigger_run_missing_run_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/apis/v2beta1/runs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = KfpClient::new(server.uri(), "test-token");
        let err = client
            .trigger_run("p1", "run1", ParameterSet::new())
            .await
            .unwrap_err();

        match err {
            ClientError::MalformedResponse { operation, field } => {
                assert_eq!(operation, "create run");
                assert_eq!(field, "run_id");
            }
            other => panic!("expected MalformedResponse, got: {other}"),
        }
    }

    #[tokio::test]
    async fn test_trigger_run_non_string_run_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/apis/v2beta1/runs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "run_id": 17 })))
            .mount(&server)
            .await;

        let client = KfpClient::new(server.uri(), "test-token");
        let err = client
            .trigger_run("p1", "run1", ParameterSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse { field: "run_id", .. }));
    }

    #[tokio::test]
    async fn test_trigger_run_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/apis/v2beta1/runs"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string("unknown parameter sdg_foo"),
            )
            .mount(&server)
            .await;

        let client = KfpClient::new(server.uri(), "test-token");
        let err = client
            .trigger_run("p1", "run1", ParameterSet::new())
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("unknown parameter sdg_foo"));
    }

    #[tokio::test]
    async fn test_get_run() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/apis/v2beta1/runs/r-42"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "run_id": "r-42",
                "display_name": "run1",
                "state": "RUNNING",
                "created_at": "2025-03-01T10:00:00Z"
            })))
            .mount(&server)
            .await;

        let client = KfpClient::new(server.uri(), "test-token");
        let snapshot = client.get_run("r-42").await.unwrap();
        assert_eq!(snapshot.status, RunStatus::Active("RUNNING".into()));
        assert_eq!(snapshot.run_id.as_deref(), Some("r-42"));
        assert!(snapshot.created_at.is_some());
    }

    #[tokio::test]
    async fn test_get_run_escapes_run_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/apis/v2beta1/runs/a%2Fb%3Fx"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "RUNNING" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = KfpClient::new(server.uri(), "test-token");
        let snapshot = client.get_run("a/b?x").await.unwrap();
        assert_eq!(snapshot.status, RunStatus::Active("RUNNING".into()));
    }

    #[tokio::test]
    async fn test_get_run_missing_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/apis/v2beta1/runs/r-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "run_id": "r-42" })))
            .mount(&server)
            .await;

        let client = KfpClient::new(server.uri(), "test-token");
        let err = client.get_run("r-42").await.unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse { field: "state", .. }));
    }

    #[tokio::test]
    async fn test_get_run_unknown_run() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/apis/v2beta1/runs/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_string("run not found"))
            .mount(&server)
            .await;

        let client = KfpClient::new(server.uri(), "test-token");
        let err = client.get_run("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
