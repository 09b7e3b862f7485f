//! Membership transactions
//!
//! A `WireTransaction` is the signed content. Its id is the BLAKE3 digest of
//! its bincode encoding, and every signature in a `SignedTransaction` is a
//! signature over that id.

use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use shared_crypto::{PartyKeyPair, PublicKey, Signature};
use shared_types::{
    current_timestamp_millis, MembershipState, Party, SecureHash, StateAndRef, StateRef,
    TransitionCommand,
};
use std::collections::BTreeSet;

/// Transition tag plus who started it and whose signatures it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Which transition.
    pub value: TransitionCommand,
    /// Party that initiated the transition.
    pub initiator: Party,
    /// Keys that must sign, besides the notary.
    pub signers: Vec<PublicKey>,
}

/// Which outputs of a transaction a vault should track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatesToRecord {
    /// Only outputs whose identity is the vault owner.
    OnlyRelevant,
    /// Every output.
    AllVisible,
}

/// Transaction content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTransaction {
    /// Consumed states with their refs.
    pub inputs: Vec<StateAndRef>,
    /// Produced states.
    pub outputs: Vec<MembershipState>,
    /// Exactly one for membership transactions.
    pub commands: Vec<Command>,
    /// Uniqueness service that must sign.
    pub notary: Party,
    /// Build time (unix ms).
    pub timestamp: u64,
}

impl WireTransaction {
    /// BLAKE3 of the canonical encoding.
    pub fn compute_id(&self) -> LedgerResult<SecureHash> {
        let bytes = bincode::serialize(self).map_err(|e| LedgerError::Serialization {
            reason: e.to_string(),
        })?;
        Ok(SecureHash::of(&bytes))
    }

    /// The single command.
    pub fn command(&self) -> LedgerResult<&Command> {
        match self.commands.as_slice() {
            [command] => Ok(command),
            [] => Err(LedgerError::MissingCommand),
            commands => Err(LedgerError::CommandCount {
                count: commands.len(),
            }),
        }
    }

    /// Command signers plus the notary.
    pub fn required_signing_keys(&self) -> BTreeSet<PublicKey> {
        let mut keys: BTreeSet<PublicKey> = self
            .commands
            .iter()
            .flat_map(|c| c.signers.iter().copied())
            .collect();
        keys.insert(*self.notary.owning_key());
        keys
    }

    /// Refs of the consumed states.
    pub fn input_refs(&self) -> impl Iterator<Item = &StateRef> {
        self.inputs.iter().map(|input| &input.reference)
    }
}

/// A signature over a transaction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    /// Signing key.
    pub by: PublicKey,
    /// Signature over the id bytes.
    pub signature: Signature,
}

impl TransactionSignature {
    /// Sign `tx_id` with `keys`.
    pub fn create(keys: &PartyKeyPair, tx_id: &SecureHash) -> Self {
        Self {
            by: keys.public_key(),
            signature: keys.sign(tx_id.as_bytes()),
        }
    }

    /// Check against `tx_id`.
    pub fn verify(&self, tx_id: &SecureHash) -> LedgerResult<()> {
        self.by
            .verify(tx_id.as_bytes(), &self.signature)
            .map_err(|_| LedgerError::InvalidSignature {
                key: self.by.short_hex(),
                tx_id: tx_id.to_string(),
            })
    }
}

/// Wire transaction plus signatures. Once notarised it is the commitment
/// record for its outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    id: SecureHash,
    /// Content.
    pub tx: WireTransaction,
    sigs: Vec<TransactionSignature>,
}

impl SignedTransaction {
    /// Wrap `tx` with no signatures.
    pub fn new(tx: WireTransaction) -> LedgerResult<Self> {
        let id = tx.compute_id()?;
        Ok(Self {
            id,
            tx,
            sigs: Vec::new(),
        })
    }

    /// Transaction id.
    pub fn id(&self) -> SecureHash {
        self.id
    }

    /// Signatures collected so far.
    pub fn sigs(&self) -> &[TransactionSignature] {
        &self.sigs
    }

    /// The single command.
    pub fn command(&self) -> LedgerResult<&Command> {
        self.tx.command()
    }

    /// Outputs of the transaction.
    pub fn outputs(&self) -> &[MembershipState] {
        &self.tx.outputs
    }

    /// Outputs paired with the refs they are recorded under.
    pub fn output_refs(&self) -> Vec<StateAndRef> {
        self.tx
            .outputs
            .iter()
            .enumerate()
            .map(|(index, state)| StateAndRef {
                state: state.clone(),
                reference: StateRef::new(self.id, index as u32),
            })
            .collect()
    }

    /// Same transaction with `signature` added. Duplicate keys are ignored.
    pub fn with_signature(mut self, signature: TransactionSignature) -> Self {
        if !self.sigs.iter().any(|s| s.by == signature.by) {
            self.sigs.push(signature);
        }
        self
    }

    /// Whether `key` has signed.
    pub fn is_signed_by(&self, key: &PublicKey) -> bool {
        self.sigs.iter().any(|s| &s.by == key)
    }

    /// Recompute the id from the content.
    pub fn verify_id(&self) -> LedgerResult<()> {
        let computed = self.tx.compute_id()?;
        if computed != self.id {
            return Err(LedgerError::IdMismatch {
                claimed: self.id.to_string(),
                computed: computed.to_string(),
            });
        }
        Ok(())
    }

    /// Every present signature verifies and comes from a required key, and
    /// every required key outside `allowed_missing` has signed.
    pub fn verify_signatures_except(&self, allowed_missing: &[PublicKey]) -> LedgerResult<()> {
        self.verify_id()?;
        let required = self.tx.required_signing_keys();

        for sig in &self.sigs {
            if !required.contains(&sig.by) {
                return Err(LedgerError::UnexpectedSigner {
                    key: sig.by.short_hex(),
                    tx_id: self.id.to_string(),
                });
            }
            sig.verify(&self.id)?;
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|key| !self.is_signed_by(key) && !allowed_missing.contains(key))
            .map(|key| key.short_hex())
            .collect();
        if !missing.is_empty() {
            return Err(LedgerError::MissingSignatures {
                tx_id: self.id.to_string(),
                missing,
            });
        }
        Ok(())
    }

    /// Fully signed, notary included.
    pub fn verify_required_signatures(&self) -> LedgerResult<()> {
        self.verify_signatures_except(&[])
    }
}

/// Assembles a membership transaction.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    notary: Party,
    inputs: Vec<StateAndRef>,
    outputs: Vec<MembershipState>,
    commands: Vec<Command>,
}

impl TransactionBuilder {
    /// Empty transaction notarised by `notary`.
    pub fn new(notary: Party) -> Self {
        Self {
            notary,
            inputs: Vec::new(),
            outputs: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Consume `input`.
    pub fn add_input_state(mut self, input: StateAndRef) -> Self {
        self.inputs.push(input);
        self
    }

    /// Produce `output`.
    pub fn add_output_state(mut self, output: MembershipState) -> Self {
        self.outputs.push(output);
        self
    }

    /// Attach the transition command.
    pub fn add_command(mut self, value: TransitionCommand, initiator: Party, signers: Vec<PublicKey>) -> Self {
        self.commands.push(Command {
            value,
            initiator,
            signers,
        });
        self
    }

    /// Freeze into wire form, timestamped now.
    pub fn to_wire_transaction(self) -> LedgerResult<WireTransaction> {
        let tx = WireTransaction {
            inputs: self.inputs,
            outputs: self.outputs,
            commands: self.commands,
            notary: self.notary,
            timestamp: current_timestamp_millis(),
        };
        tx.command()?;
        Ok(tx)
    }
}
