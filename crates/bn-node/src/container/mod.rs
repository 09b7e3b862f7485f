//! # Node Container
//!
//! Configuration and the wiring of one party's components.

pub mod config;
pub mod node;

pub use config::{load_config, ConfigError, MembershipConfig, MessagingConfig, NodeConfig, NodeIdentityConfig};
pub use node::{BusinessNetworkNode, NodeLedger, NodeMembershipService};
