//! Error types for the node runtime

use crate::container::ConfigError;
use bn_02_membership::MembershipError;
use thiserror::Error;

/// Node runtime errors
#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Membership(#[from] MembershipError),

    /// A counterparty did not record a transition in time.
    #[error("{observer} did not reach the expected view of {member} in {network_id} within {waited_ms} ms")]
    NotObserved {
        observer: String,
        member: String,
        network_id: String,
        waited_ms: u64,
    },
}

pub type NodeResult<T> = Result<T, NodeError>;
