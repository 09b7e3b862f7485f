//! Driving Ports (API - Inbound)
//!
//! The ledger sub-protocols a membership flow drives: local signing, signature
//! collection, finality, and plain transaction transfer.

use crate::domain::{SignedTransaction, StatesToRecord, TransactionBuilder};
use crate::error::LedgerResult;
use async_trait::async_trait;
use shared_bus::ProtocolSession;
use shared_types::{Party, SecureHash};

/// Check a responder applies to a proposed or finalized transaction.
/// `Err` carries the reason reported back to the initiator.
pub type TransactionCheck = dyn Fn(&SignedTransaction) -> Result<(), String> + Send + Sync;

/// Primary Ledger API
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Party this ledger signs for.
    fn our_identity(&self) -> &Party;

    /// Notary to name in new transactions.
    fn notary_identity(&self) -> &Party;

    /// Verify the contract and sign with our key.
    fn sign_initial_transaction(&self, builder: TransactionBuilder) -> LedgerResult<SignedTransaction>;

    /// Gather a signature from each session's counterparty. All sessions run
    /// concurrently; the call returns once every one has answered.
    async fn collect_signatures(
        &self,
        stx: SignedTransaction,
        sessions: &[&ProtocolSession],
    ) -> LedgerResult<SignedTransaction>;

    /// Responder side of `collect_signatures`.
    async fn sign_transaction(
        &self,
        session: &ProtocolSession,
        check: &TransactionCheck,
    ) -> LedgerResult<SignedTransaction>;

    /// Notarise, record, and send the result to every session.
    async fn finalize(
        &self,
        stx: SignedTransaction,
        sessions: &[&ProtocolSession],
        states_to_record: StatesToRecord,
    ) -> LedgerResult<SignedTransaction>;

    /// Responder side of `finalize`. When `expected_tx_id` is set the
    /// finalized transaction must be that one. `check` runs before recording.
    async fn receive_finality(
        &self,
        session: &ProtocolSession,
        expected_tx_id: Option<SecureHash>,
        check: Option<&TransactionCheck>,
        states_to_record: StatesToRecord,
    ) -> LedgerResult<SignedTransaction>;

    /// Send an already finalized transaction.
    async fn send_transaction(&self, session: &ProtocolSession, stx: &SignedTransaction) -> LedgerResult<()>;

    /// Receive, verify and record a finalized transaction.
    async fn receive_transaction(
        &self,
        session: &ProtocolSession,
        states_to_record: StatesToRecord,
    ) -> LedgerResult<SignedTransaction>;

    /// Locally recorded transaction by id.
    fn lookup_commitment_record(&self, tx_id: &SecureHash) -> Option<SignedTransaction>;
}
