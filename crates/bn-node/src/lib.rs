//! # Business-Network Node Library
//!
//! Exposes the node wiring for the demo binary and the integration tests.
//!
//! ## Layout
//!
//! - `container/` - configuration and the wiring of one party
//! - `network` - several parties sharing a notary and a session network
//! - `scenario` - the end-to-end membership lifecycle

pub mod container;
pub mod error;
pub mod network;
pub mod scenario;

pub use container::{load_config, BusinessNetworkNode, ConfigError, NodeConfig};
pub use error::{NodeError, NodeResult};
pub use network::LocalNetwork;
pub use scenario::{run_lifecycle, LifecycleReport, LifecycleStep};
