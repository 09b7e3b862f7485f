//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::{SignedTransaction, TransactionSignature};
use crate::error::LedgerResult;
use async_trait::async_trait;
use shared_types::Party;

/// Uniqueness service
///
/// Signs a transaction only if none of its inputs were consumed by another
/// transaction it signed before.
#[async_trait]
pub trait NotaryGateway: Send + Sync {
    /// The notary's identity, as named in transactions.
    fn notary_identity(&self) -> &Party;

    /// Commit `stx`'s inputs and return the notary signature.
    async fn notarise(&self, stx: &SignedTransaction) -> LedgerResult<TransactionSignature>;
}
