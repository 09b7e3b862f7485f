//! Signing and finalisation across a set of observer sessions
//!
//! The initiator tells each observer whether it must sign, collects the
//! signatures, waits until every non-signer is ready, and finalises to all.

use crate::error::MembershipResult;
use crate::protocol::ObserverReady;
use bn_01_ledger::{LedgerApi, SignedTransaction, StatesToRecord, TransactionBuilder, TransactionCheck};
use shared_bus::ProtocolSession;
use shared_types::Party;
use tracing::debug;

/// Initiator side.
///
/// `observer_sessions` covers every counterparty, signers included. Any
/// failure before the notary commit aborts the run with nothing recorded.
pub async fn collect_signatures_and_finalise<L: LedgerApi + ?Sized>(
    ledger: &L,
    builder: TransactionBuilder,
    observer_sessions: &[ProtocolSession],
    signers: &[Party],
) -> MembershipResult<SignedTransaction> {
    for session in observer_sessions {
        let is_signer = signers.contains(session.counterparty());
        session.send(&is_signer).await?;
    }

    let stx = ledger.sign_initial_transaction(builder)?;

    let (signer_sessions, watchers): (Vec<&ProtocolSession>, Vec<&ProtocolSession>) = observer_sessions
        .iter()
        .partition(|session| signers.contains(session.counterparty()));

    let stx = ledger.collect_signatures(stx, &signer_sessions).await?;
    debug!(tx_id = %stx.id(), signers = signer_sessions.len(), "[bn-02] Signatures collected");

    for session in &watchers {
        let _: ObserverReady = session.receive().await?;
    }

    let all: Vec<&ProtocolSession> = observer_sessions.iter().collect();
    let stx = ledger.finalize(stx, &all, StatesToRecord::AllVisible).await?;
    Ok(stx)
}

/// Responder side. Signers countersign after `check`; non-signers apply
/// `check` to the finalized record before recording it.
pub async fn sign_and_receive_finalised_transaction<L: LedgerApi + ?Sized>(
    ledger: &L,
    session: &ProtocolSession,
    check: &TransactionCheck,
) -> MembershipResult<SignedTransaction> {
    let is_signer: bool = session.receive().await?;

    let stx = if is_signer {
        let signed = ledger.sign_transaction(session, check).await?;
        ledger
            .receive_finality(session, Some(signed.id()), None, StatesToRecord::AllVisible)
            .await?
    } else {
        session.send(&ObserverReady).await?;
        ledger
            .receive_finality(session, None, Some(check), StatesToRecord::AllVisible)
            .await?
    };
    Ok(stx)
}
