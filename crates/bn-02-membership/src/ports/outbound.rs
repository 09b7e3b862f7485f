//! Driven Ports (SPI - Outbound Dependencies)

use crate::error::MembershipResult;
use bn_01_ledger::SignedTransaction;
use shared_types::{MembershipStatus, Party, StateAndRef, UniqueIdentifier};

/// Read-only view of the membership facts this party holds.
pub trait MembershipStore: Send + Sync {
    /// Current fact of `party` in `network_id`.
    fn get_membership(&self, network_id: &str, party: &Party) -> Option<StateAndRef>;

    /// Current revision of the membership with `linear_id`.
    fn get_membership_by_id(&self, linear_id: &UniqueIdentifier) -> Option<StateAndRef>;

    /// Current facts in `network_id` whose status is one of `statuses`.
    fn get_all_memberships_with_status(&self, network_id: &str, statuses: &[MembershipStatus]) -> Vec<StateAndRef>;

    /// Whether any current fact of `network_id` is known.
    fn business_network_exists(&self, network_id: &str) -> bool;

    /// The finalized transaction that produced `membership`.
    fn resolve_commitment_record(&self, membership: &StateAndRef) -> MembershipResult<SignedTransaction>;
}
