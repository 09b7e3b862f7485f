//! Membership sync
//!
//! After a member gains standing the initiator pushes it the commitment
//! records it needs to see the network. Every observer session gets a count
//! first (zero unless it is the sync target), then that many records.

use crate::domain::MemberAuthorization;
use crate::error::{MembershipError, MembershipResult};
use crate::ports::outbound::MembershipStore;
use bn_01_ledger::{LedgerApi, LedgerError, SignedTransaction, StatesToRecord};
use shared_bus::{ProtocolSession, SessionError};
use shared_types::{MembershipState, MembershipStatus, Party, StateAndRef};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Records to push to one party, resolved before the transition commits.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub target: Party,
    pub records: Vec<SignedTransaction>,
}

impl SyncPlan {
    /// Record count as announced on the wire.
    pub fn count(&self) -> MembershipResult<u32> {
        u32::try_from(self.records.len()).map_err(|_| MembershipError::SyncTooLarge {
            records: self.records.len(),
        })
    }
}

/// Work out what `new_fact`'s holder should receive: the authorised members'
/// facts, plus the full roster when the policy lets the new fact see it. The
/// holder's own membership is left out.
pub fn prepare_membership_sync<S: MembershipStore + ?Sized>(
    store: &S,
    policy: &dyn MemberAuthorization,
    new_fact: &MembershipState,
    authorised: &[StateAndRef],
) -> MembershipResult<SyncPlan> {
    let mut facts: Vec<StateAndRef> = authorised.to_vec();
    if policy.can_view_all_memberships(new_fact) {
        facts.extend(store.get_all_memberships_with_status(&new_fact.network_id, &MembershipStatus::ALL));
    }

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for fact in facts {
        if fact.state.linear_id == new_fact.linear_id {
            continue;
        }
        let record = store.resolve_commitment_record(&fact)?;
        if seen.insert(record.id()) {
            records.push(record);
        }
    }

    let plan = SyncPlan {
        target: new_fact.identity.clone(),
        records,
    };
    plan.count()?;
    Ok(plan)
}

/// Stream the target its count and records, then send every other observer
/// a zero count.
///
/// Only a failure toward the target is an error. Other observers that have
/// already left are logged and skipped.
pub async fn send_memberships<L: LedgerApi + ?Sized>(
    ledger: &L,
    plan: &SyncPlan,
    observer_sessions: &[ProtocolSession],
) -> MembershipResult<()> {
    let count = plan.count()?;
    let (targets, others): (Vec<&ProtocolSession>, Vec<&ProtocolSession>) = observer_sessions
        .iter()
        .partition(|session| session.counterparty() == &plan.target);

    for session in targets {
        session.send(&count).await?;
        for record in &plan.records {
            ledger.send_transaction(session, record).await?;
        }
        debug!(sync_target = %plan.target, records = count, "[bn-02] Memberships sent");
    }

    for session in others {
        if let Err(e) = session.send(&0u32).await {
            warn!(
                counterparty = %session.counterparty(),
                error = %e,
                "[bn-02] Observer left before membership sync"
            );
        }
    }
    Ok(())
}

/// Drain exactly the announced number of records. Returns how many arrived.
pub async fn receive_memberships<L: LedgerApi + ?Sized>(
    ledger: &L,
    session: &ProtocolSession,
    max_records: u32,
) -> MembershipResult<u32> {
    let announced: u32 = session.receive().await?;
    if announced > max_records {
        return Err(MembershipError::SyncLimitExceeded {
            announced,
            limit: max_records,
        });
    }

    for received in 0..announced {
        match ledger
            .receive_transaction(session, StatesToRecord::AllVisible)
            .await
        {
            Ok(_) => {}
            Err(LedgerError::Session(SessionError::Closed { .. })) => {
                return Err(MembershipError::SyncDesync { announced, received });
            }
            Err(e) => return Err(e.into()),
        }
    }

    if announced > 0 {
        debug!(from = %session.counterparty(), records = announced, "[bn-02] Memberships received");
    }
    Ok(announced)
}
