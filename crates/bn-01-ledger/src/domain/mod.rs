//! Domain layer for the ledger substrate

pub mod contract;
pub mod transaction;
pub mod vault;

pub use contract::{ContractViolation, MembershipContract};
pub use transaction::{
    Command, SignedTransaction, StatesToRecord, TransactionBuilder, TransactionSignature,
    WireTransaction,
};
pub use vault::Vault;
