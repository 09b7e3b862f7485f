//! # Shared Crypto - Party Identity Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | BLAKE3 | Transaction ids, seed derivation |
//! | `signatures` | Ed25519 | Party and notary signatures over transaction ids |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **Seeds**: zeroized after the signing key is derived

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::{CryptoError, CryptoResult};
pub use hashing::{blake3_derive_seed, blake3_hash, Hash};
pub use signatures::{PartyKeyPair, PublicKey, Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
