//! Adapters to the systems around the reconcilers: the put.io API and the
//! Kubernetes store

mod gateway;
mod putio;
mod remote_feed;
mod secrets;
mod store;

pub use gateway::*;
pub use putio::*;
pub use remote_feed::*;
pub use secrets::*;
pub use store::*;
