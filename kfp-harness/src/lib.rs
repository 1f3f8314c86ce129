//! KFP Harness
//!
//! End-to-end check of a pipeline on a Kubeflow-Pipelines style service:
//! find it by display name, start a run, and wait for `SUCCEEDED`.
//!
//! The library half holds the configuration and the driving procedure so
//! both the `kfp-harness` binary and integration tests can use them.

pub mod config;
pub mod harness;

pub use config::HarnessConfig;
pub use harness::{E2eOutcome, run_pipeline_e2e};
