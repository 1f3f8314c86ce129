//! KFP Core
//!
//! Core types for driving a Kubeflow-Pipelines style orchestration service.
//!
//! This crate contains:
//! - Domain types: what the harness observes (pipelines, runs, run states)
//! - DTOs: the v2beta1 REST wire format
//! - Parameters: the opaque run parameter mapping and its YAML loader

pub mod domain;
pub mod dto;
pub mod params;

pub use params::{ParameterError, ParameterSet};
