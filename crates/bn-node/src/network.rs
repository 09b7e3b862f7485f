//! # Local Network
//!
//! Several nodes in one process, sharing one notary and one session network.

use crate::container::{BusinessNetworkNode, MembershipConfig, NodeConfig, NodeIdentityConfig};
use crate::error::NodeResult;
use bn_01_ledger::InMemoryNotary;
use bn_02_membership::PolicyKind;
use shared_bus::InMemorySessionNetwork;
use shared_crypto::{blake3_derive_seed, PartyKeyPair};
use std::sync::Arc;
use tracing::info;

pub const NOTARY_NAME: &str = "O=Notary, L=London, C=GB";

pub struct LocalNetwork {
    notary: Arc<InMemoryNotary>,
    sessions: Arc<InMemorySessionNetwork>,
    membership: MembershipConfig,
}

impl LocalNetwork {
    /// Network whose nodes use `config`'s membership and messaging settings.
    pub fn new(config: &NodeConfig) -> Self {
        let notary_keys = PartyKeyPair::from_seed(blake3_derive_seed(NOTARY_NAME));
        let notary = Arc::new(InMemoryNotary::new(NOTARY_NAME, notary_keys));
        let sessions = Arc::new(InMemorySessionNetwork::with_config(config.messaging.session_config()));
        info!(
            notary = NOTARY_NAME,
            policy = %config.membership.policy,
            "[bn-node] Local network ready"
        );
        Self {
            notary,
            sessions,
            membership: config.membership.clone(),
        }
    }

    /// Default settings with `policy`.
    pub fn with_policy(policy: PolicyKind) -> Self {
        let mut config = NodeConfig::default();
        config.membership.policy = policy;
        Self::new(&config)
    }

    /// Start a node called `name` with a key derived from the name.
    pub fn spawn_node(&self, name: &str) -> NodeResult<BusinessNetworkNode> {
        self.spawn_node_with(&NodeIdentityConfig {
            name: name.to_string(),
            key_seed: None,
        })
    }

    pub fn spawn_node_with(&self, identity: &NodeIdentityConfig) -> NodeResult<BusinessNetworkNode> {
        BusinessNetworkNode::new(
            identity,
            &self.membership,
            Arc::clone(&self.notary),
            Arc::clone(&self.sessions),
        )
    }

    pub fn notary(&self) -> &Arc<InMemoryNotary> {
        &self.notary
    }

    pub fn sessions(&self) -> &Arc<InMemorySessionNetwork> {
        &self.sessions
    }
}
