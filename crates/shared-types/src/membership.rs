//! # Membership Entities
//!
//! A `MembershipState` is one party's standing in one business network.
//! Revisions share a `linear_id`; only status, roles and `modified_at`
//! change between revisions.

use crate::entities::{Party, StateRef, UniqueIdentifier};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Lifecycle status of a membership. Revocation removes the fact instead of
/// producing a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MembershipStatus {
    /// Requested, awaiting activation.
    Pending,
    /// Full member.
    Active,
    /// Temporarily barred.
    Suspended,
}

impl MembershipStatus {
    /// Every status a current fact can carry.
    pub const ALL: [MembershipStatus; 3] = [
        MembershipStatus::Pending,
        MembershipStatus::Active,
        MembershipStatus::Suspended,
    ];

    /// Whether a fact in `self` may move to `next`.
    ///
    /// PENDING -> ACTIVE, ACTIVE -> SUSPENDED, SUSPENDED -> ACTIVE.
    pub fn can_transition_to(self, next: MembershipStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active)
                | (Self::Active, Self::Suspended)
                | (Self::Suspended, Self::Active)
        )
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
        };
        f.write_str(s)
    }
}

/// Management right carried by a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdminPermission {
    /// May activate pending or suspended memberships and admit new members.
    CanActivateMembership,
    /// May suspend active memberships.
    CanSuspendMembership,
    /// May revoke memberships.
    CanRevokeMembership,
    /// May change the roles of a membership.
    CanModifyRoles,
}

impl AdminPermission {
    /// All permissions.
    pub const ALL: [AdminPermission; 4] = [
        AdminPermission::CanActivateMembership,
        AdminPermission::CanSuspendMembership,
        AdminPermission::CanRevokeMembership,
        AdminPermission::CanModifyRoles,
    ];
}

/// A named set of management rights.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MembershipRole {
    /// Role name.
    pub name: String,
    /// Rights granted by the role.
    pub permissions: BTreeSet<AdminPermission>,
}

impl MembershipRole {
    /// Role with the given rights.
    pub fn new(name: impl Into<String>, permissions: impl IntoIterator<Item = AdminPermission>) -> Self {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().collect(),
        }
    }

    /// The network operator role: every right.
    pub fn administrator() -> Self {
        Self::new("BNO", AdminPermission::ALL)
    }

    /// Whether the role grants `permission`.
    pub fn grants(&self, permission: AdminPermission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// One revision of a party's membership in a business network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipState {
    /// The member.
    pub identity: Party,
    /// Opaque business network id.
    pub network_id: String,
    /// Current status.
    pub status: MembershipStatus,
    /// Stable across revisions.
    pub linear_id: UniqueIdentifier,
    /// Management roles held by the member.
    pub roles: BTreeSet<MembershipRole>,
    /// Free-form attributes supplied at request time.
    pub metadata: BTreeMap<String, String>,
    /// Creation time of the first revision (unix ms).
    pub issued_at: u64,
    /// Creation time of this revision (unix ms).
    pub modified_at: u64,
}

impl MembershipState {
    /// First revision of a requested membership.
    pub fn pending(
        identity: Party,
        network_id: impl Into<String>,
        metadata: BTreeMap<String, String>,
        now: u64,
    ) -> Self {
        Self {
            identity,
            network_id: network_id.into(),
            status: MembershipStatus::Pending,
            linear_id: UniqueIdentifier::new(),
            roles: BTreeSet::new(),
            metadata,
            issued_at: now,
            modified_at: now,
        }
    }

    /// First revision of a network creator's membership: active, with the
    /// administrator role.
    pub fn founder(identity: Party, network_id: impl Into<String>, now: u64) -> Self {
        Self {
            identity,
            network_id: network_id.into(),
            status: MembershipStatus::Active,
            linear_id: UniqueIdentifier::new(),
            roles: BTreeSet::from([MembershipRole::administrator()]),
            metadata: BTreeMap::new(),
            issued_at: now,
            modified_at: now,
        }
    }

    /// Next revision with a different status.
    pub fn with_status(&self, status: MembershipStatus, now: u64) -> Self {
        Self {
            status,
            modified_at: now.max(self.modified_at),
            ..self.clone()
        }
    }

    /// Next revision with a different role set.
    pub fn with_roles(&self, roles: BTreeSet<MembershipRole>, now: u64) -> Self {
        Self {
            roles,
            modified_at: now.max(self.modified_at),
            ..self.clone()
        }
    }

    /// PENDING?
    pub fn is_pending(&self) -> bool {
        self.status == MembershipStatus::Pending
    }

    /// ACTIVE?
    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }

    /// SUSPENDED?
    pub fn is_suspended(&self) -> bool {
        self.status == MembershipStatus::Suspended
    }

    /// Whether any held role grants `permission`.
    pub fn has_permission(&self, permission: AdminPermission) -> bool {
        self.roles.iter().any(|role| role.grants(permission))
    }

    /// Whether any role grants any management right.
    pub fn has_any_permission(&self) -> bool {
        AdminPermission::ALL.iter().any(|p| self.has_permission(*p))
    }

    /// Whether `other` is a revision of the same membership: same member,
    /// network and linear id.
    pub fn same_lineage(&self, other: &MembershipState) -> bool {
        self.linear_id == other.linear_id
            && self.identity == other.identity
            && self.network_id == other.network_id
    }
}

/// A recorded state together with where it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAndRef {
    /// The membership revision.
    pub state: MembershipState,
    /// Output that produced it.
    pub reference: StateRef,
}

/// Transition tag carried by every membership transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionCommand {
    /// Network creation: the founder's first revision.
    Create,
    /// New PENDING membership.
    Request,
    /// PENDING or SUSPENDED -> ACTIVE.
    Activate,
    /// ACTIVE -> SUSPENDED.
    Suspend,
    /// Removes the membership.
    Revoke,
    /// Replaces the role set.
    ModifyRoles,
}

impl fmt::Display for TransitionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "Create",
            Self::Request => "Request",
            Self::Activate => "Activate",
            Self::Suspend => "Suspend",
            Self::Revoke => "Revoke",
            Self::ModifyRoles => "ModifyRoles",
        };
        f.write_str(s)
    }
}
