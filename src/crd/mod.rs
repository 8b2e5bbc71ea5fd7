//! Custom Resource Definitions for the put.io Feed Operator

mod feed;

pub use feed::*;

use kube::CustomResourceExt;

/// Generate all CRD YAML manifests
pub fn generate_crds() -> Result<Vec<String>, serde_yaml::Error> {
    Ok(vec![serde_yaml::to_string(&Feed::crd())?])
}
