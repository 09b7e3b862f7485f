//! Error types for the ledger substrate

use crate::domain::contract::ContractViolation;
use shared_bus::SessionError;
use thiserror::Error;

/// Ledger errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Builder has no command
    #[error("Transaction has no command")]
    MissingCommand,

    /// More than one command on a membership transaction
    #[error("Transaction must carry exactly one command, found {count}")]
    CommandCount { count: usize },

    /// Contract rejected the transaction
    #[error("Contract verification failed: {0}")]
    Contract(#[from] ContractViolation),

    /// Canonical encoding failed
    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },

    /// Received transaction does not hash to its claimed id
    #[error("Transaction id mismatch: claimed {claimed}, computed {computed}")]
    IdMismatch { claimed: String, computed: String },

    /// A signature does not verify against the transaction id
    #[error("Invalid signature by key {key} on transaction {tx_id}")]
    InvalidSignature { key: String, tx_id: String },

    /// A signature from a key that is not a required signer
    #[error("Signature by key {key} is not required by transaction {tx_id}")]
    UnexpectedSigner { key: String, tx_id: String },

    /// Required signatures are missing
    #[error("Transaction {tx_id} is missing signatures from {missing:?}")]
    MissingSignatures { tx_id: String, missing: Vec<String> },

    /// Countersignature came back from the wrong key
    #[error("Expected a signature from {expected}, received one from {actual}")]
    SignerMismatch { expected: String, actual: String },

    /// Counterparty asked to sign is not a required signer
    #[error("{party} is not a required signer of transaction {tx_id}")]
    NotARequiredSigner { party: String, tx_id: String },

    /// Transaction names a notary we do not use
    #[error("Unknown notary {notary}")]
    UnknownNotary { notary: String },

    /// Input already consumed by another transaction
    #[error("Input {state_ref} already consumed by transaction {consumed_by}")]
    DoubleSpend {
        state_ref: String,
        consumed_by: String,
    },

    /// Finalized transaction differs from the one we signed
    #[error("Expected finalized transaction {expected}, received {actual}")]
    UnexpectedTransaction { expected: String, actual: String },

    /// Local check refused the proposed transaction
    #[error("{reason}")]
    TransactionRejected { reason: String },

    /// Session failure during a ledger sub-protocol
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
