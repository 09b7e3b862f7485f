//! Adapters for the ledger substrate

pub mod notary;

pub use notary::InMemoryNotary;
