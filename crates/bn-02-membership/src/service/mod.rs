//! Membership Service - lifecycle transitions driven by this party

mod responder;

pub use responder::MembershipResponder;

use crate::domain::{
    observer_parties, runs_membership_sync, ManagementAction, ManagementTransition, MemberAuthorization,
};
use crate::error::{MembershipError, MembershipResult, Side};
use crate::ports::inbound::MembershipManagementApi;
use crate::ports::outbound::MembershipStore;
use crate::protocol::finalisation::collect_signatures_and_finalise;
use crate::protocol::sync::{prepare_membership_sync, send_memberships};
use crate::protocol::{protocol_for, MembershipRequest};
use async_trait::async_trait;
use bn_01_ledger::{LedgerApi, SignedTransaction, StatesToRecord, TransactionBuilder};
use shared_bus::{ProtocolSession, SessionMessaging};
use shared_types::{
    current_timestamp_millis, MembershipRole, MembershipState, MembershipStatus, Party, StateAndRef,
    TransitionCommand, UniqueIdentifier,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Membership service configuration
#[derive(Clone, Debug)]
pub struct MembershipServiceConfig {
    /// Most commitment records a responder accepts in one membership sync
    pub max_sync_records: u32,
}

impl Default for MembershipServiceConfig {
    fn default() -> Self {
        Self {
            max_sync_records: 10_000,
        }
    }
}

/// What initiator and responder share: the ledger, the local view and the
/// policy.
pub struct MembershipContext<L: LedgerApi, S: MembershipStore> {
    pub(crate) ledger: Arc<L>,
    pub(crate) store: Arc<S>,
    pub(crate) policy: Arc<dyn MemberAuthorization>,
    pub(crate) config: MembershipServiceConfig,
}

impl<L: LedgerApi, S: MembershipStore> MembershipContext<L, S> {
    pub(crate) fn our_identity(&self) -> &Party {
        self.ledger.our_identity()
    }

    /// Our current fact in `network_id`, provided it is active and the policy
    /// lets it perform `action`.
    pub(crate) fn authorise(
        &self,
        network_id: &str,
        side: Side,
        action: ManagementAction,
    ) -> MembershipResult<StateAndRef> {
        let membership = self
            .store
            .get_membership(network_id, self.our_identity())
            .ok_or(MembershipError::NotMember { side })?;
        if !membership.state.is_active() {
            return Err(MembershipError::MembershipNotActive { side });
        }
        if !self.policy.permits(action, &membership.state) {
            return Err(MembershipError::NotAuthorised { side, action });
        }
        Ok(membership)
    }

    /// Current facts in `network_id` whose holders may view the whole roster.
    pub(crate) fn authorised_memberships(&self, network_id: &str) -> Vec<StateAndRef> {
        self.store
            .get_all_memberships_with_status(network_id, &MembershipStatus::ALL)
            .into_iter()
            .filter(|m| self.policy.can_view_all_memberships(&m.state))
            .collect()
    }
}

/// Membership Service
///
/// Initiates transitions on behalf of one party. The matching responder,
/// from [`MembershipService::responder`], must be registered with the
/// session network for the party to take part in transitions others start.
pub struct MembershipService<L: LedgerApi, S: MembershipStore> {
    context: Arc<MembershipContext<L, S>>,
    messaging: Arc<dyn SessionMessaging>,
}

impl<L: LedgerApi, S: MembershipStore> MembershipService<L, S> {
    pub fn new(
        ledger: Arc<L>,
        store: Arc<S>,
        policy: Arc<dyn MemberAuthorization>,
        messaging: Arc<dyn SessionMessaging>,
        config: MembershipServiceConfig,
    ) -> Self {
        Self {
            context: Arc::new(MembershipContext {
                ledger,
                store,
                policy,
                config,
            }),
            messaging,
        }
    }

    /// Responder answering sessions opened toward this party.
    pub fn responder(&self) -> Arc<MembershipResponder<L, S>> {
        Arc::new(MembershipResponder::new(Arc::clone(&self.context)))
    }

    /// This party's view of the networks it belongs to.
    pub fn store(&self) -> &Arc<S> {
        &self.context.store
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.context.ledger
    }

    /// Active policy.
    pub fn policy(&self) -> &Arc<dyn MemberAuthorization> {
        &self.context.policy
    }

    fn open_sessions(
        &self,
        counterparties: &[Party],
        command: TransitionCommand,
    ) -> MembershipResult<Vec<ProtocolSession>> {
        let protocol = protocol_for(command).ok_or_else(|| MembershipError::UnsupportedProtocol {
            protocol: command.to_string(),
        })?;
        let me = self.context.our_identity();
        counterparties
            .iter()
            .map(|party| {
                self.messaging
                    .open_session(me, party, protocol)
                    .map_err(MembershipError::from)
            })
            .collect()
    }

    async fn run_management(
        &self,
        linear_id: UniqueIdentifier,
        transition: ManagementTransition,
    ) -> MembershipResult<SignedTransaction> {
        let ctx = &self.context;
        let me = ctx.our_identity().clone();

        let target = ctx
            .store
            .get_membership_by_id(&linear_id)
            .ok_or(MembershipError::MembershipNotFound { linear_id })?;
        let network_id = target.state.network_id.clone();
        ctx.authorise(&network_id, Side::Initiator, transition.action())?;

        let output = transition.apply(&target.state, current_timestamp_millis())?;
        let command = transition.command();
        let affected = target.state.identity.clone();
        let authorised = ctx.authorised_memberships(&network_id);
        let observers = observer_parties(&me, &affected, &authorised);
        let signers = transition.signers(&me, &affected);

        // Resolved before commit: a missing record aborts the transition.
        let sync_plan = match &output {
            Some(new_fact) if runs_membership_sync(command) => Some(prepare_membership_sync(
                ctx.store.as_ref(),
                ctx.policy.as_ref(),
                new_fact,
                &authorised,
            )?),
            _ => None,
        };

        let mut builder = TransactionBuilder::new(ctx.ledger.notary_identity().clone()).add_input_state(target);
        if let Some(new_fact) = output {
            builder = builder.add_output_state(new_fact);
        }
        let signer_keys = signers.iter().map(|p| *p.owning_key()).collect();
        let builder = builder.add_command(command, me.clone(), signer_keys);

        let sessions = self.open_sessions(&observers, command)?;
        debug!(
            %network_id,
            %linear_id,
            %command,
            observers = sessions.len(),
            "[bn-02] Running membership transition"
        );
        let stx = collect_signatures_and_finalise(ctx.ledger.as_ref(), builder, &sessions, &signers).await?;

        if let Some(plan) = sync_plan {
            // Committed: a failed push leaves the target to catch up later.
            if let Err(e) = send_memberships(ctx.ledger.as_ref(), &plan, &sessions).await {
                warn!(sync_target = %plan.target, error = %e, "[bn-02] Membership sync failed");
            }
        }

        info!(%network_id, %linear_id, %command, tx_id = %stx.id(), "[bn-02] Membership transition finalised");
        Ok(stx)
    }
}

#[async_trait]
impl<L, S> MembershipManagementApi for MembershipService<L, S>
where
    L: LedgerApi + 'static,
    S: MembershipStore + 'static,
{
    async fn create_business_network(&self, network_id: Option<String>) -> MembershipResult<SignedTransaction> {
        let ctx = &self.context;
        let me = ctx.our_identity().clone();
        let network_id = network_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        if ctx.store.business_network_exists(&network_id) {
            return Err(MembershipError::NetworkAlreadyExists { network_id });
        }
        if !ctx.policy.can_create_network(&me) {
            return Err(MembershipError::NotAuthorised {
                side: Side::Initiator,
                action: ManagementAction::CreateNetwork,
            });
        }

        let founder = MembershipState::founder(me.clone(), network_id.clone(), current_timestamp_millis());
        let builder = TransactionBuilder::new(ctx.ledger.notary_identity().clone())
            .add_output_state(founder)
            .add_command(TransitionCommand::Create, me.clone(), vec![*me.owning_key()]);

        let stx = ctx.ledger.sign_initial_transaction(builder)?;
        let stx = ctx.ledger.finalize(stx, &[], StatesToRecord::AllVisible).await?;
        info!(%network_id, tx_id = %stx.id(), "[bn-02] Business network created");
        Ok(stx)
    }

    async fn request_membership(
        &self,
        authorised_party: &Party,
        network_id: &str,
        metadata: BTreeMap<String, String>,
    ) -> MembershipResult<SignedTransaction> {
        let ctx = &self.context;
        let me = ctx.our_identity().clone();

        if ctx.store.get_membership(network_id, &me).is_some() {
            return Err(MembershipError::AlreadyMember {
                network_id: network_id.to_string(),
            });
        }

        let session = self
            .messaging
            .open_session(&me, authorised_party, crate::protocol::REQUEST_MEMBERSHIP)?;
        session
            .send(&MembershipRequest {
                network_id: network_id.to_string(),
            })
            .await?;

        let pending = MembershipState::pending(me.clone(), network_id, metadata, current_timestamp_millis());
        let linear_id = pending.linear_id;
        let builder = TransactionBuilder::new(ctx.ledger.notary_identity().clone())
            .add_output_state(pending)
            .add_command(TransitionCommand::Request, me.clone(), vec![*me.owning_key()]);

        let stx = collect_signatures_and_finalise(ctx.ledger.as_ref(), builder, &[session], &[me]).await?;
        info!(
            %network_id,
            %linear_id,
            authorised_party = %authorised_party,
            tx_id = %stx.id(),
            "[bn-02] Membership requested"
        );
        Ok(stx)
    }

    async fn activate_membership(&self, linear_id: UniqueIdentifier) -> MembershipResult<SignedTransaction> {
        self.run_management(linear_id, ManagementTransition::Activate).await
    }

    async fn suspend_membership(&self, linear_id: UniqueIdentifier) -> MembershipResult<SignedTransaction> {
        self.run_management(linear_id, ManagementTransition::Suspend).await
    }

    async fn revoke_membership(&self, linear_id: UniqueIdentifier) -> MembershipResult<SignedTransaction> {
        self.run_management(linear_id, ManagementTransition::Revoke).await
    }

    async fn modify_roles(
        &self,
        linear_id: UniqueIdentifier,
        roles: BTreeSet<MembershipRole>,
    ) -> MembershipResult<SignedTransaction> {
        self.run_management(linear_id, ManagementTransition::ModifyRoles(roles))
            .await
    }
}
