//! Ports module for the ledger substrate

pub mod inbound;
pub mod outbound;

pub use inbound::{LedgerApi, TransactionCheck};
pub use outbound::NotaryGateway;
