//! Membership store over a party's ledger vault

use crate::error::{MembershipError, MembershipResult};
use crate::ports::outbound::MembershipStore;
use bn_01_ledger::{SignedTransaction, Vault};
use shared_types::{MembershipStatus, Party, StateAndRef, UniqueIdentifier};
use std::sync::Arc;

/// `MembershipStore` reading unconsumed states from a `Vault`.
pub struct VaultMembershipStore {
    vault: Arc<Vault>,
}

impl VaultMembershipStore {
    pub fn new(vault: Arc<Vault>) -> Self {
        Self { vault }
    }
}

impl MembershipStore for VaultMembershipStore {
    fn get_membership(&self, network_id: &str, party: &Party) -> Option<StateAndRef> {
        self.vault
            .query(|m| m.network_id == network_id && &m.identity == party)
            .into_iter()
            .max_by_key(|m| m.state.modified_at)
    }

    fn get_membership_by_id(&self, linear_id: &UniqueIdentifier) -> Option<StateAndRef> {
        self.vault
            .query(|m| &m.linear_id == linear_id)
            .into_iter()
            .max_by_key(|m| m.state.modified_at)
    }

    fn get_all_memberships_with_status(&self, network_id: &str, statuses: &[MembershipStatus]) -> Vec<StateAndRef> {
        self.vault
            .query(|m| m.network_id == network_id && statuses.contains(&m.status))
    }

    fn business_network_exists(&self, network_id: &str) -> bool {
        !self.vault.query(|m| m.network_id == network_id).is_empty()
    }

    fn resolve_commitment_record(&self, membership: &StateAndRef) -> MembershipResult<SignedTransaction> {
        self.vault
            .transaction(&membership.reference.tx_id)
            .ok_or(MembershipError::CommitmentRecordNotFound {
                linear_id: membership.state.linear_id,
            })
    }
}
