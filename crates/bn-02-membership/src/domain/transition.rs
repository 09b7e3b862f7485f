//! Management transitions
//!
//! What each transition does to the affected fact, who must sign it and who
//! observes it.

use crate::domain::policy::ManagementAction;
use crate::error::{MembershipError, MembershipResult};
use shared_types::{MembershipRole, MembershipState, MembershipStatus, Party, StateAndRef, TransitionCommand};
use std::collections::BTreeSet;

/// A transition applied by a manager to an existing membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagementTransition {
    Activate,
    Suspend,
    Revoke,
    ModifyRoles(BTreeSet<MembershipRole>),
}

impl ManagementTransition {
    /// Command tag recorded on the ledger.
    pub fn command(&self) -> TransitionCommand {
        match self {
            Self::Activate => TransitionCommand::Activate,
            Self::Suspend => TransitionCommand::Suspend,
            Self::Revoke => TransitionCommand::Revoke,
            Self::ModifyRoles(_) => TransitionCommand::ModifyRoles,
        }
    }

    /// Right the initiator needs.
    pub fn action(&self) -> ManagementAction {
        match self {
            Self::Activate => ManagementAction::ActivateMembership,
            Self::Suspend => ManagementAction::SuspendMembership,
            Self::Revoke => ManagementAction::RevokeMembership,
            Self::ModifyRoles(_) => ManagementAction::ModifyRoles,
        }
    }

    /// The successor revision, or `None` when the fact is removed.
    pub fn apply(&self, current: &MembershipState, now: u64) -> MembershipResult<Option<MembershipState>> {
        match self {
            Self::Activate => {
                if !current.status.can_transition_to(MembershipStatus::Active) {
                    return Err(invalid("Membership is already active"));
                }
                Ok(Some(current.with_status(MembershipStatus::Active, now)))
            }
            Self::Suspend => {
                if current.is_suspended() {
                    return Err(invalid("Membership is already suspended"));
                }
                if !current.status.can_transition_to(MembershipStatus::Suspended) {
                    return Err(invalid("Only active membership can be suspended"));
                }
                Ok(Some(current.with_status(MembershipStatus::Suspended, now)))
            }
            Self::Revoke => Ok(None),
            Self::ModifyRoles(roles) => {
                if *roles == current.roles {
                    return Err(invalid("Membership already holds the requested roles"));
                }
                Ok(Some(current.with_roles(roles.clone(), now)))
            }
        }
    }

    /// Parties whose signatures the transaction needs. A revoked member cannot
    /// veto its removal.
    pub fn signers(&self, initiator: &Party, affected: &Party) -> Vec<Party> {
        let mut signers = vec![initiator.clone()];
        if !matches!(self, Self::Revoke) && affected != initiator {
            signers.push(affected.clone());
        }
        signers
    }
}

/// Right a command's initiator must hold, for commands that need one.
pub fn management_action(command: TransitionCommand) -> Option<ManagementAction> {
    match command {
        TransitionCommand::Activate => Some(ManagementAction::ActivateMembership),
        TransitionCommand::Suspend => Some(ManagementAction::SuspendMembership),
        TransitionCommand::Revoke => Some(ManagementAction::RevokeMembership),
        TransitionCommand::ModifyRoles => Some(ManagementAction::ModifyRoles),
        TransitionCommand::Create | TransitionCommand::Request => None,
    }
}

/// Whether the affected party is brought up to date after the transition.
pub fn runs_membership_sync(command: TransitionCommand) -> bool {
    matches!(command, TransitionCommand::Activate | TransitionCommand::ModifyRoles)
}

/// The affected party first, then every authorised member, without the
/// initiator and without duplicates.
pub fn observer_parties(initiator: &Party, affected: &Party, authorised: &[StateAndRef]) -> Vec<Party> {
    let mut observers: Vec<Party> = Vec::new();
    let candidates = std::iter::once(affected).chain(authorised.iter().map(|m| &m.state.identity));
    for party in candidates {
        if party != initiator && !observers.contains(party) {
            observers.push(party.clone());
        }
    }
    observers
}

fn invalid(reason: &str) -> MembershipError {
    MembershipError::InvalidTransition {
        reason: reason.to_string(),
    }
}
