//! # Business-Network Node
//!
//! One party: its ledger, its membership view, its policy and the responder
//! that answers sessions opened toward it.
//!
//! ```text
//!   LedgerService ──vault──▶ VaultMembershipStore
//!        │                          │
//!        └──────────┬───────────────┘
//!                   ▼
//!          MembershipService ──responder()──▶ InMemorySessionNetwork
//! ```

use crate::container::config::{MembershipConfig, NodeIdentityConfig};
use crate::error::{NodeError, NodeResult};
use bn_01_ledger::{InMemoryNotary, LedgerApi, LedgerService, Vault};
use bn_02_membership::{MembershipService, MembershipStore, VaultMembershipStore};
use shared_bus::{InMemorySessionNetwork, SessionMessaging};
use shared_crypto::{blake3_derive_seed, PartyKeyPair};
use shared_types::{MembershipState, Party, StateAndRef};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Ledger of a node on the in-process network.
pub type NodeLedger = LedgerService<InMemoryNotary>;

/// Membership service of a node on the in-process network.
pub type NodeMembershipService = MembershipService<NodeLedger, VaultMembershipStore>;

/// How often `wait_for_membership` re-reads the store.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

pub struct BusinessNetworkNode {
    party: Party,
    ledger: Arc<NodeLedger>,
    membership: NodeMembershipService,
}

impl BusinessNetworkNode {
    /// Build the node and register its responder with `sessions`.
    pub fn new(
        identity: &NodeIdentityConfig,
        membership: &MembershipConfig,
        notary: Arc<InMemoryNotary>,
        sessions: Arc<InMemorySessionNetwork>,
    ) -> NodeResult<Self> {
        let keys = match &identity.key_seed {
            Some(seed) => PartyKeyPair::from_hex_seed(seed).map_err(|e| NodeError::Config(e.into()))?,
            None => PartyKeyPair::from_seed(blake3_derive_seed(&identity.name)),
        };
        let ledger = Arc::new(LedgerService::new(identity.name.clone(), keys, notary));
        let party = ledger.our_identity().clone();
        let store = Arc::new(VaultMembershipStore::new(ledger.vault()));

        let service = MembershipService::new(
            Arc::clone(&ledger),
            store,
            membership.policy.build(),
            Arc::clone(&sessions) as Arc<dyn SessionMessaging>,
            membership.service_config(),
        );
        sessions.register(party.clone(), service.responder());

        info!(
            party = %party,
            key = %party.owning_key().short_hex(),
            policy = %membership.policy,
            "[bn-node] Node started"
        );
        Ok(Self {
            party,
            ledger,
            membership: service,
        })
    }

    /// The party this node signs as.
    pub fn party(&self) -> &Party {
        &self.party
    }

    /// Lifecycle entry points.
    pub fn membership(&self) -> &NodeMembershipService {
        &self.membership
    }

    pub fn ledger(&self) -> &Arc<NodeLedger> {
        &self.ledger
    }

    pub fn vault(&self) -> Arc<Vault> {
        self.ledger.vault()
    }

    /// Current fact of `party` in `network_id`, as this node sees it.
    pub fn get_membership(&self, network_id: &str, party: &Party) -> Option<StateAndRef> {
        self.membership.store().get_membership(network_id, party)
    }

    /// Wait until this node holds a fact of `party` in `network_id` that
    /// satisfies `predicate`. Counterparties record finalized transactions
    /// after the initiator has returned.
    pub async fn wait_for_membership<F>(
        &self,
        network_id: &str,
        party: &Party,
        timeout: Duration,
        predicate: F,
    ) -> NodeResult<StateAndRef>
    where
        F: Fn(&MembershipState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(found) = self.get_membership(network_id, party) {
                if predicate(&found.state) {
                    return Ok(found);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(NodeError::NotObserved {
                    observer: self.party.name().to_string(),
                    member: party.name().to_string(),
                    network_id: network_id.to_string(),
                    waited_ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait until this node holds no fact of `party` in `network_id`.
    pub async fn wait_for_removal(&self, network_id: &str, party: &Party, timeout: Duration) -> NodeResult<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.get_membership(network_id, party).is_some() {
            if tokio::time::Instant::now() >= deadline {
                return Err(NodeError::NotObserved {
                    observer: self.party.name().to_string(),
                    member: party.name().to_string(),
                    network_id: network_id.to_string(),
                    waited_ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        Ok(())
    }
}
