//! Data Transfer Objects for the pipeline service REST API
//!
//! Request and response bodies of the `apis/v2beta1` endpoints. Field names
//! follow the service's snake_case JSON exactly.

pub mod pipeline;
pub mod run;
