//! Core domain types
//!
//! These types describe what the harness learns about the remote service.
//! All of them are owned by the service; the harness only reads them.

pub mod pipeline;
pub mod run;
