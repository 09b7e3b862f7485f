//! # bn-02-membership
//!
//! Membership lifecycle of a business network: who may join, who may manage
//! whom, and how every member's view stays consistent.
//!
//! ## Overview
//!
//! - **Policy**: a pluggable capability set ([`MemberAuthorization`]) deciding
//!   which members may admit, activate, suspend, revoke or re-role others
//! - **Transitions**: create, request, activate, suspend, revoke and modify
//!   roles, each committed as one notarised transaction
//! - **Observers**: every member entitled to the full roster records each
//!   transition, not only the parties that sign it
//! - **Sync**: a member that gains standing is sent the records it needs
//!
//! ## Lifecycle
//!
//! ```text
//!   (none) ──request──▶ PENDING ──activate──▶ ACTIVE ◀──activate── SUSPENDED
//!                          │                    │ ──────suspend────────▲
//!                          └──────── revoke ────┴────── revoke ────────┘
//! ```
//!
//! ## Protocol run
//!
//! ```text
//! initiator                               observers
//!    │ ──is_signer flag──────────────────────▶│
//!    │ ──proposal──▶ signers ──signature──▶   │
//!    │ ◀──────────────ObserverReady───────────│ (non-signers)
//!    │ finalize ──notarised record───────────▶│ verify, record
//!    │ ──sync count, records─────────────────▶│ (activate, modify roles)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use bn_02_membership::{MembershipManagementApi, MembershipService, PolicyKind};
//!
//! let service = MembershipService::new(ledger, store, PolicyKind::RoleBased.build(), network, config);
//! network.register(party, service.responder());
//!
//! service.create_business_network(Some("net".into())).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod protocol;
pub mod service;

pub use adapters::VaultMembershipStore;
pub use domain::{
    ManagementAction, ManagementTransition, MemberAuthorization, PolicyKind, PublicDecentralisedPolicy,
    RoleBasedPolicy, UnknownPolicy,
};
pub use error::{ErrorCategory, MembershipError, MembershipResult, Side};
pub use ports::{MembershipManagementApi, MembershipStore};
pub use protocol::sync::SyncPlan;
pub use service::{MembershipContext, MembershipResponder, MembershipService, MembershipServiceConfig};
