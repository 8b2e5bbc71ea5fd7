//! CRD YAML Generator
//!
//! This binary generates the Kubernetes CRD manifest for the Feed resource.
//!
//! Usage: cargo run --bin crdgen > deploy/crds/feed.yaml

use putio_feed_operator::crd::generate_crds;

fn main() -> anyhow::Result<()> {
    for crd in generate_crds()? {
        println!("---");
        print!("{}", crd);
    }
    Ok(())
}
