//! # bn-01-ledger
//!
//! Ledger substrate for business-network membership.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Transactions**: membership revisions with a single transition command,
//!   identified by the BLAKE3 hash of their encoding
//! - **Contract**: structural rules per transition, checked by every party
//! - **Notary**: double-spend protection over consumed state refs
//! - **Vault**: each party's recorded transactions and unconsumed states
//! - **Sub-protocols**: signature collection and finality over sessions
//!
//! ## Finality
//!
//! ```text
//! initiator                          counterparty
//!    │ sign_initial_transaction           │
//!    │ collect_signatures ──stx──────────▶│ sign_transaction
//!    │◀────────────────────signature──────│
//!    │ finalize: notarise, record         │
//!    │ ──────────────notarised stx───────▶│ receive_finality: verify, record
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use bn_01_ledger::{InMemoryNotary, LedgerService, LedgerApi, StatesToRecord};
//!
//! let notary = Arc::new(InMemoryNotary::new("O=Notary", PartyKeyPair::generate()));
//! let ledger = LedgerService::new("O=BNO", PartyKeyPair::generate(), notary);
//!
//! let stx = ledger.sign_initial_transaction(builder)?;
//! let stx = ledger.finalize(stx, &[], StatesToRecord::AllVisible).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::InMemoryNotary;
pub use domain::{
    Command, ContractViolation, MembershipContract, SignedTransaction, StatesToRecord,
    TransactionBuilder, TransactionSignature, Vault, WireTransaction,
};
pub use error::{LedgerError, LedgerResult};
pub use ports::{LedgerApi, NotaryGateway, TransactionCheck};
pub use service::LedgerService;
