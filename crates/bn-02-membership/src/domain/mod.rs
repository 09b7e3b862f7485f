//! Domain layer for the membership subsystem

pub mod policy;
pub mod transition;

pub use policy::{
    ManagementAction, MemberAuthorization, PolicyKind, PublicDecentralisedPolicy, RoleBasedPolicy,
    UnknownPolicy,
};
pub use transition::{management_action, observer_parties, runs_membership_sync, ManagementTransition};
