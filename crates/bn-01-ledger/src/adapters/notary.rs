//! In-process notary
//!
//! A single-node uniqueness service. It keeps every consumed `StateRef` and
//! the transaction that consumed it.

use crate::domain::{MembershipContract, SignedTransaction, TransactionSignature};
use crate::error::{LedgerError, LedgerResult};
use crate::ports::outbound::NotaryGateway;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_crypto::PartyKeyPair;
use shared_types::{Party, SecureHash, StateRef};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Notary backed by an in-memory consumed-state map.
pub struct InMemoryNotary {
    identity: Party,
    keys: PartyKeyPair,
    consumed: Mutex<HashMap<StateRef, SecureHash>>,
}

impl InMemoryNotary {
    /// Notary called `name` signing with `keys`.
    pub fn new(name: impl Into<String>, keys: PartyKeyPair) -> Self {
        let identity = Party::new(name, keys.public_key());
        Self {
            identity,
            keys,
            consumed: Mutex::new(HashMap::new()),
        }
    }

    /// Number of states committed as consumed.
    pub fn consumed_count(&self) -> usize {
        self.consumed.lock().len()
    }
}

#[async_trait]
impl NotaryGateway for InMemoryNotary {
    fn notary_identity(&self) -> &Party {
        &self.identity
    }

    async fn notarise(&self, stx: &SignedTransaction) -> LedgerResult<TransactionSignature> {
        if stx.tx.notary != self.identity {
            return Err(LedgerError::UnknownNotary {
                notary: stx.tx.notary.name().to_string(),
            });
        }
        stx.verify_signatures_except(&[*self.identity.owning_key()])?;
        MembershipContract::verify(&stx.tx)?;

        let tx_id = stx.id();
        {
            let mut consumed = self.consumed.lock();
            for input in stx.tx.input_refs() {
                if let Some(by) = consumed.get(input) {
                    if *by != tx_id {
                        warn!(state_ref = %input, consumed_by = %by, "[bn-01] Double spend rejected");
                        return Err(LedgerError::DoubleSpend {
                            state_ref: input.to_string(),
                            consumed_by: by.to_string(),
                        });
                    }
                }
            }
            for input in stx.tx.input_refs() {
                consumed.insert(*input, tx_id);
            }
        }

        debug!(tx_id = %tx_id, inputs = stx.tx.inputs.len(), "[bn-01] Transaction notarised");
        Ok(TransactionSignature::create(&self.keys, &tx_id))
    }
}
