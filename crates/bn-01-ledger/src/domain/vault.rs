//! Per-party vault
//!
//! Holds the transactions a party committed or was sent, and the unconsumed
//! states among their outputs. Recording is idempotent, and a state consumed
//! by any recorded transaction is never tracked again, whatever order the
//! records arrive in.

use crate::domain::transaction::{SignedTransaction, StatesToRecord};
use parking_lot::RwLock;
use shared_types::{MembershipState, Party, SecureHash, StateAndRef, StateRef};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Default)]
struct VaultState {
    transactions: HashMap<SecureHash, SignedTransaction>,
    unconsumed: HashMap<StateRef, MembershipState>,
    consumed: HashSet<StateRef>,
}

/// One party's recorded ledger view.
pub struct Vault {
    owner: Party,
    state: RwLock<VaultState>,
}

impl Vault {
    /// Empty vault for `owner`.
    pub fn new(owner: Party) -> Self {
        Self {
            owner,
            state: RwLock::new(VaultState::default()),
        }
    }

    /// Whose vault this is.
    pub fn owner(&self) -> &Party {
        &self.owner
    }

    /// Record `stx`. Returns false if it was already recorded.
    pub fn record(&self, stx: &SignedTransaction, states_to_record: StatesToRecord) -> bool {
        let mut state = self.state.write();
        let tx_id = stx.id();
        if state.transactions.contains_key(&tx_id) {
            return false;
        }

        for input in stx.tx.input_refs() {
            state.unconsumed.remove(input);
            state.consumed.insert(*input);
        }

        for output in stx.output_refs() {
            let relevant = match states_to_record {
                StatesToRecord::AllVisible => true,
                StatesToRecord::OnlyRelevant => output.state.identity == self.owner,
            };
            if relevant && !state.consumed.contains(&output.reference) {
                state.unconsumed.insert(output.reference, output.state);
            }
        }

        state.transactions.insert(tx_id, stx.clone());
        debug!(owner = %self.owner, tx_id = %tx_id, "[bn-01] Transaction recorded");
        true
    }

    /// Recorded transaction by id.
    pub fn transaction(&self, tx_id: &SecureHash) -> Option<SignedTransaction> {
        self.state.read().transactions.get(tx_id).cloned()
    }

    /// Unconsumed states matching `predicate`, oldest first.
    pub fn query<F>(&self, predicate: F) -> Vec<StateAndRef>
    where
        F: Fn(&MembershipState) -> bool,
    {
        let state = self.state.read();
        let mut found: Vec<StateAndRef> = state
            .unconsumed
            .iter()
            .filter(|(_, s)| predicate(s))
            .map(|(reference, s)| StateAndRef {
                state: s.clone(),
                reference: *reference,
            })
            .collect();
        found.sort_by(|a, b| {
            (a.state.issued_at, a.state.linear_id, a.reference)
                .cmp(&(b.state.issued_at, b.state.linear_id, b.reference))
        });
        found
    }

    /// Number of recorded transactions.
    pub fn transaction_count(&self) -> usize {
        self.state.read().transactions.len()
    }
}
