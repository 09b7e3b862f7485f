//! Driving Ports (API - Inbound)

use crate::error::MembershipResult;
use async_trait::async_trait;
use bn_01_ledger::SignedTransaction;
use shared_types::{MembershipRole, Party, UniqueIdentifier};
use std::collections::{BTreeMap, BTreeSet};

/// Membership lifecycle entry points
///
/// Each call runs one transition to completion and returns the finalized
/// transaction. A failed call leaves no ledger change.
#[async_trait]
pub trait MembershipManagementApi: Send + Sync {
    /// Start a network with the caller as its only, active, administrator
    /// member. A random id is used when none is given.
    async fn create_business_network(&self, network_id: Option<String>) -> MembershipResult<SignedTransaction>;

    /// Ask `authorised_party` to record a pending membership for the caller.
    async fn request_membership(
        &self,
        authorised_party: &Party,
        network_id: &str,
        metadata: BTreeMap<String, String>,
    ) -> MembershipResult<SignedTransaction>;

    /// PENDING or SUSPENDED -> ACTIVE.
    async fn activate_membership(&self, linear_id: UniqueIdentifier) -> MembershipResult<SignedTransaction>;

    /// ACTIVE -> SUSPENDED.
    async fn suspend_membership(&self, linear_id: UniqueIdentifier) -> MembershipResult<SignedTransaction>;

    /// Remove the membership.
    async fn revoke_membership(&self, linear_id: UniqueIdentifier) -> MembershipResult<SignedTransaction>;

    /// Replace the membership's roles.
    async fn modify_roles(
        &self,
        linear_id: UniqueIdentifier,
        roles: BTreeSet<MembershipRole>,
    ) -> MembershipResult<SignedTransaction>;
}
