//! Adapters for the membership subsystem

pub mod vault_store;

pub use vault_store::VaultMembershipStore;
