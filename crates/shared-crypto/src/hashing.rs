//! # BLAKE3 Hashing
//!
//! Transaction identifiers are BLAKE3 digests of the canonical transaction
//! encoding. Seeds for deterministic party keys are derived with BLAKE3's
//! key-derivation mode.

/// BLAKE3 hash output (256-bit).
pub type Hash = [u8; 32];

/// Context string for party key seeds.
const SEED_CONTEXT: &str = "business-network 2024 party key seed";

/// Hash data with BLAKE3 (one-shot).
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Derive a 32-byte key seed from a party name.
///
/// Used by local networks and demos so that a node started twice with the
/// same name gets the same identity.
pub fn blake3_derive_seed(name: &str) -> [u8; 32] {
    blake3::derive_key(SEED_CONTEXT, name.as_bytes())
}
