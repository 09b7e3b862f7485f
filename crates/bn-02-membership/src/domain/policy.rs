//! Authorization policy
//!
//! Decides whether a member may perform a management action. Predicates are
//! pure functions of the member's current fact.

use shared_types::{AdminPermission, MembershipState, Party};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Management actions gated by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagementAction {
    /// Start a new business network.
    CreateNetwork,
    /// Accept membership requests.
    AdmitMembers,
    /// Activate a pending or suspended membership.
    ActivateMembership,
    /// Suspend an active membership.
    SuspendMembership,
    /// Remove a membership.
    RevokeMembership,
    /// Change a membership's roles.
    ModifyRoles,
}

impl fmt::Display for ManagementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateNetwork => "create business network",
            // Admission is approved with the activation right.
            Self::AdmitMembers | Self::ActivateMembership => "activate membership",
            Self::SuspendMembership => "suspend membership",
            Self::RevokeMembership => "revoke membership",
            Self::ModifyRoles => "modify roles",
        };
        f.write_str(s)
    }
}

/// Capability set consulted before every management action.
pub trait MemberAuthorization: Send + Sync {
    /// Policy name for logs.
    fn name(&self) -> &'static str;

    /// Whether `creator` may start a network.
    fn can_create_network(&self, creator: &Party) -> bool;

    /// Whether the holder of `membership` may accept membership requests.
    fn can_admit_members(&self, membership: &MembershipState) -> bool {
        self.can_activate_membership(membership)
    }

    fn can_activate_membership(&self, membership: &MembershipState) -> bool;

    fn can_suspend_membership(&self, membership: &MembershipState) -> bool;

    fn can_revoke_membership(&self, membership: &MembershipState) -> bool;

    fn can_modify_roles(&self, membership: &MembershipState) -> bool;

    /// Whether the holder may see the whole roster. Holders of any management
    /// right may.
    fn can_view_all_memberships(&self, membership: &MembershipState) -> bool {
        self.can_activate_membership(membership)
            || self.can_suspend_membership(membership)
            || self.can_revoke_membership(membership)
            || self.can_modify_roles(membership)
    }

    /// Dispatch on `action`.
    fn permits(&self, action: ManagementAction, membership: &MembershipState) -> bool {
        match action {
            ManagementAction::CreateNetwork => self.can_create_network(&membership.identity),
            ManagementAction::AdmitMembers => self.can_admit_members(membership),
            ManagementAction::ActivateMembership => self.can_activate_membership(membership),
            ManagementAction::SuspendMembership => self.can_suspend_membership(membership),
            ManagementAction::RevokeMembership => self.can_revoke_membership(membership),
            ManagementAction::ModifyRoles => self.can_modify_roles(membership),
        }
    }
}

/// Every active member may do everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct PublicDecentralisedPolicy;

impl MemberAuthorization for PublicDecentralisedPolicy {
    fn name(&self) -> &'static str {
        "public-decentralised"
    }

    fn can_create_network(&self, _creator: &Party) -> bool {
        true
    }

    fn can_activate_membership(&self, membership: &MembershipState) -> bool {
        membership.is_active()
    }

    fn can_suspend_membership(&self, membership: &MembershipState) -> bool {
        membership.is_active()
    }

    fn can_revoke_membership(&self, membership: &MembershipState) -> bool {
        membership.is_active()
    }

    fn can_modify_roles(&self, membership: &MembershipState) -> bool {
        membership.is_active()
    }
}

/// Active members holding a role with the matching permission.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleBasedPolicy;

impl RoleBasedPolicy {
    fn allows(membership: &MembershipState, permission: AdminPermission) -> bool {
        membership.is_active() && membership.has_permission(permission)
    }
}

impl MemberAuthorization for RoleBasedPolicy {
    fn name(&self) -> &'static str {
        "role-based"
    }

    fn can_create_network(&self, _creator: &Party) -> bool {
        true
    }

    fn can_activate_membership(&self, membership: &MembershipState) -> bool {
        Self::allows(membership, AdminPermission::CanActivateMembership)
    }

    fn can_suspend_membership(&self, membership: &MembershipState) -> bool {
        Self::allows(membership, AdminPermission::CanSuspendMembership)
    }

    fn can_revoke_membership(&self, membership: &MembershipState) -> bool {
        Self::allows(membership, AdminPermission::CanRevokeMembership)
    }

    fn can_modify_roles(&self, membership: &MembershipState) -> bool {
        Self::allows(membership, AdminPermission::CanModifyRoles)
    }
}

/// Configured policy name is not known.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown membership policy '{0}', expected public-decentralised or role-based")]
pub struct UnknownPolicy(pub String);

/// Policies a node can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyKind {
    #[default]
    PublicDecentralised,
    RoleBased,
}

impl PolicyKind {
    /// Instantiate the policy.
    pub fn build(self) -> Arc<dyn MemberAuthorization> {
        match self {
            Self::PublicDecentralised => Arc::new(PublicDecentralisedPolicy),
            Self::RoleBased => Arc::new(RoleBasedPolicy),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public-decentralised" | "public-decentralized" => Ok(Self::PublicDecentralised),
            "role-based" => Ok(Self::RoleBased),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicDecentralised => f.write_str("public-decentralised"),
            Self::RoleBased => f.write_str("role-based"),
        }
    }
}
