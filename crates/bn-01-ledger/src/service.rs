//! Ledger Service - signing, collection and finality over sessions

use crate::domain::{
    MembershipContract, SignedTransaction, StatesToRecord, TransactionBuilder,
    TransactionSignature, Vault,
};
use crate::error::{LedgerError, LedgerResult};
use crate::ports::inbound::{LedgerApi, TransactionCheck};
use crate::ports::outbound::NotaryGateway;
use async_trait::async_trait;
use futures::future::try_join_all;
use shared_bus::ProtocolSession;
use shared_crypto::{PartyKeyPair, PublicKey};
use shared_types::{Party, SecureHash};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One party's ledger: its key, its vault and the shared notary.
pub struct LedgerService<N: NotaryGateway> {
    identity: Party,
    keys: PartyKeyPair,
    notary: Arc<N>,
    vault: Arc<Vault>,
}

impl<N: NotaryGateway> LedgerService<N> {
    /// Ledger for the party called `name`, owning `keys`.
    pub fn new(name: impl Into<String>, keys: PartyKeyPair, notary: Arc<N>) -> Self {
        let identity = Party::new(name, keys.public_key());
        let vault = Arc::new(Vault::new(identity.clone()));
        Self {
            identity,
            keys,
            notary,
            vault,
        }
    }

    /// This party's vault.
    pub fn vault(&self) -> Arc<Vault> {
        Arc::clone(&self.vault)
    }

    fn notary_key(&self) -> PublicKey {
        *self.notary.notary_identity().owning_key()
    }

    fn check_notary(&self, stx: &SignedTransaction) -> LedgerResult<()> {
        if &stx.tx.notary != self.notary.notary_identity() {
            return Err(LedgerError::UnknownNotary {
                notary: stx.tx.notary.name().to_string(),
            });
        }
        Ok(())
    }

    /// Full check of a record received from a counterparty.
    fn verify_finalized(&self, stx: &SignedTransaction) -> LedgerResult<()> {
        self.check_notary(stx)?;
        stx.verify_required_signatures()?;
        MembershipContract::verify(&stx.tx)?;
        Ok(())
    }
}

#[async_trait]
impl<N: NotaryGateway + 'static> LedgerApi for LedgerService<N> {
    fn our_identity(&self) -> &Party {
        &self.identity
    }

    fn notary_identity(&self) -> &Party {
        self.notary.notary_identity()
    }

    fn sign_initial_transaction(&self, builder: TransactionBuilder) -> LedgerResult<SignedTransaction> {
        let wire = builder.to_wire_transaction()?;
        MembershipContract::verify(&wire)?;
        let stx = SignedTransaction::new(wire)?;
        let signature = TransactionSignature::create(&self.keys, &stx.id());
        debug!(tx_id = %stx.id(), "[bn-01] Signed initial transaction");
        Ok(stx.with_signature(signature))
    }

    async fn collect_signatures(
        &self,
        stx: SignedTransaction,
        sessions: &[&ProtocolSession],
    ) -> LedgerResult<SignedTransaction> {
        let tx_id = stx.id();
        let required = stx.tx.required_signing_keys();
        for session in sessions {
            if !required.contains(session.counterparty().owning_key()) {
                return Err(LedgerError::NotARequiredSigner {
                    party: session.counterparty().name().to_string(),
                    tx_id: tx_id.to_string(),
                });
            }
        }

        let proposal = &stx;
        let requests = sessions.iter().map(|session| async move {
            session.send(proposal).await?;
            let signature: TransactionSignature = session.receive().await?;
            if &signature.by != session.counterparty().owning_key() {
                return Err(LedgerError::SignerMismatch {
                    expected: session.counterparty().owning_key().short_hex(),
                    actual: signature.by.short_hex(),
                });
            }
            signature.verify(&tx_id)?;
            debug!(tx_id = %tx_id, signer = %session.counterparty(), "[bn-01] Countersignature received");
            Ok::<_, LedgerError>(signature)
        });
        let signatures = try_join_all(requests).await?;

        let stx = signatures
            .into_iter()
            .fold(stx, |acc, signature| acc.with_signature(signature));
        stx.verify_signatures_except(&[self.notary_key()])?;
        Ok(stx)
    }

    async fn sign_transaction(
        &self,
        session: &ProtocolSession,
        check: &TransactionCheck,
    ) -> LedgerResult<SignedTransaction> {
        let stx: SignedTransaction = session.receive().await?;
        let our_key = self.identity.owning_key();
        let required = stx.tx.required_signing_keys();
        if !required.contains(our_key) {
            return Err(LedgerError::NotARequiredSigner {
                party: self.identity.name().to_string(),
                tx_id: stx.id().to_string(),
            });
        }

        // The proposer must already have signed; everyone else may be missing.
        let proposer_key = *session.counterparty().owning_key();
        let may_be_missing: Vec<PublicKey> = required.into_iter().filter(|k| *k != proposer_key).collect();
        stx.verify_signatures_except(&may_be_missing)?;
        self.check_notary(&stx)?;
        MembershipContract::verify(&stx.tx)?;
        check(&stx).map_err(|reason| LedgerError::TransactionRejected { reason })?;

        let signature = TransactionSignature::create(&self.keys, &stx.id());
        session.send(&signature).await?;
        debug!(tx_id = %stx.id(), initiator = %session.counterparty(), "[bn-01] Countersigned transaction");
        Ok(stx.with_signature(signature))
    }

    async fn finalize(
        &self,
        stx: SignedTransaction,
        sessions: &[&ProtocolSession],
        states_to_record: StatesToRecord,
    ) -> LedgerResult<SignedTransaction> {
        self.check_notary(&stx)?;
        stx.verify_signatures_except(&[self.notary_key()])?;
        MembershipContract::verify(&stx.tx)?;

        let notary_signature = self.notary.notarise(&stx).await?;
        let stx = stx.with_signature(notary_signature);
        self.vault.record(&stx, states_to_record);
        info!(tx_id = %stx.id(), recipients = sessions.len(), "[bn-01] Transaction finalised");

        // Committed: a recipient that has gone away cannot undo it.
        for session in sessions {
            if let Err(e) = session.send(&stx).await {
                warn!(
                    tx_id = %stx.id(),
                    counterparty = %session.counterparty(),
                    error = %e,
                    "[bn-01] Failed to deliver finalised transaction"
                );
            }
        }
        Ok(stx)
    }

    async fn receive_finality(
        &self,
        session: &ProtocolSession,
        expected_tx_id: Option<SecureHash>,
        check: Option<&TransactionCheck>,
        states_to_record: StatesToRecord,
    ) -> LedgerResult<SignedTransaction> {
        let stx: SignedTransaction = session.receive().await?;
        if let Some(expected) = expected_tx_id {
            if stx.id() != expected {
                return Err(LedgerError::UnexpectedTransaction {
                    expected: expected.to_string(),
                    actual: stx.id().to_string(),
                });
            }
        }
        self.verify_finalized(&stx)?;
        if let Some(check) = check {
            check(&stx).map_err(|reason| LedgerError::TransactionRejected { reason })?;
        }
        self.vault.record(&stx, states_to_record);
        debug!(tx_id = %stx.id(), from = %session.counterparty(), "[bn-01] Received finalised transaction");
        Ok(stx)
    }

    async fn send_transaction(&self, session: &ProtocolSession, stx: &SignedTransaction) -> LedgerResult<()> {
        session.send(stx).await?;
        Ok(())
    }

    async fn receive_transaction(
        &self,
        session: &ProtocolSession,
        states_to_record: StatesToRecord,
    ) -> LedgerResult<SignedTransaction> {
        let stx: SignedTransaction = session.receive().await?;
        self.verify_finalized(&stx)?;
        self.vault.record(&stx, states_to_record);
        Ok(stx)
    }

    fn lookup_commitment_record(&self, tx_id: &SecureHash) -> Option<SignedTransaction> {
        self.vault.transaction(tx_id)
    }
}
