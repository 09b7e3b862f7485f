//! Responder side of every membership protocol

use crate::domain::{runs_membership_sync, ManagementAction};
use crate::error::{MembershipError, MembershipResult, Side};
use crate::ports::outbound::MembershipStore;
use crate::protocol::finalisation::sign_and_receive_finalised_transaction;
use crate::protocol::sync::receive_memberships;
use crate::protocol::validation::{verify_proposal, verify_request};
use crate::protocol::{command_for, MembershipRequest};
use crate::service::MembershipContext;
use async_trait::async_trait;
use bn_01_ledger::{LedgerApi, SignedTransaction};
use shared_bus::{ProtocolSession, SessionAcceptor};
use shared_types::TransitionCommand;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Answers sessions other parties open toward this one, dispatching on the
/// session's protocol.
pub struct MembershipResponder<L: LedgerApi, S: MembershipStore> {
    context: Arc<MembershipContext<L, S>>,
}

impl<L: LedgerApi, S: MembershipStore> MembershipResponder<L, S> {
    pub(crate) fn new(context: Arc<MembershipContext<L, S>>) -> Self {
        Self { context }
    }
}

impl<L, S> MembershipResponder<L, S>
where
    L: LedgerApi + 'static,
    S: MembershipStore + 'static,
{
    async fn respond(&self, session: &ProtocolSession) -> MembershipResult<SignedTransaction> {
        match command_for(session.protocol()) {
            Some(TransitionCommand::Request) => self.respond_to_request(session).await,
            Some(command) => self.respond_to_management(session, command).await,
            None => Err(MembershipError::UnsupportedProtocol {
                protocol: session.protocol().to_string(),
            }),
        }
    }

    /// We are the authorised party a membership request was addressed to.
    async fn respond_to_request(&self, session: &ProtocolSession) -> MembershipResult<SignedTransaction> {
        let ctx = &self.context;
        let requester = session.counterparty().clone();
        let request: MembershipRequest = session.receive().await?;
        let network_id = request.network_id;

        ctx.authorise(&network_id, Side::Receiver, ManagementAction::AdmitMembers)?;
        if ctx.store.get_membership(&network_id, &requester).is_some() {
            return Err(MembershipError::AlreadyMember { network_id });
        }

        let store = Arc::clone(&ctx.store);
        let policy = Arc::clone(&ctx.policy);
        let check = move |stx: &SignedTransaction| -> Result<(), String> {
            verify_request(store.as_ref(), policy.as_ref(), stx, &network_id, &requester)
                .map_err(|e| e.to_string())
        };
        let stx = sign_and_receive_finalised_transaction(ctx.ledger.as_ref(), session, &check).await?;
        info!(requester = %session.counterparty(), tx_id = %stx.id(), "[bn-02] Membership request recorded");
        Ok(stx)
    }

    async fn respond_to_management(
        &self,
        session: &ProtocolSession,
        command: TransitionCommand,
    ) -> MembershipResult<SignedTransaction> {
        let ctx = &self.context;
        let store = Arc::clone(&ctx.store);
        let policy = Arc::clone(&ctx.policy);
        let initiator = session.counterparty().clone();
        let check = move |stx: &SignedTransaction| -> Result<(), String> {
            verify_proposal(store.as_ref(), policy.as_ref(), stx, command, &initiator).map_err(|e| e.to_string())
        };

        let stx = sign_and_receive_finalised_transaction(ctx.ledger.as_ref(), session, &check).await?;
        debug!(%command, initiator = %session.counterparty(), tx_id = %stx.id(), "[bn-02] Membership transition recorded");

        if runs_membership_sync(command) {
            receive_memberships(ctx.ledger.as_ref(), session, ctx.config.max_sync_records).await?;
        }
        Ok(stx)
    }
}

#[async_trait]
impl<L, S> SessionAcceptor for MembershipResponder<L, S>
where
    L: LedgerApi + 'static,
    S: MembershipStore + 'static,
{
    async fn accept(&self, session: ProtocolSession) {
        match self.respond(&session).await {
            Ok(_) => {}
            Err(e) if e.originated_remotely() => {
                debug!(
                    protocol = %session.protocol(),
                    counterparty = %session.counterparty(),
                    error = %e,
                    "[bn-02] Counterparty ended the protocol"
                );
            }
            Err(e) => {
                warn!(
                    protocol = %session.protocol(),
                    counterparty = %session.counterparty(),
                    error = %e,
                    "[bn-02] Responder failed"
                );
                session.send_error(e.to_string()).await;
            }
        }
    }
}
