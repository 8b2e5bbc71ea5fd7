//! Prometheus metrics for the put.io Feed Operator
//!
//! This module exposes metrics for monitoring operator health and put.io traffic.

mod prometheus;

pub use self::prometheus::*;
