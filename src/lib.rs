//! put.io Feed Kubernetes Operator
//!
//! This operator mirrors `Feed` custom resources as RSS feeds on put.io,
//! keeping the remote feed, its pause state and the resource status in sync.

pub mod adapters;
pub mod config;
pub mod controllers;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod reconcilers;

pub use error::{Error, Result};
