//! # Shared Types Crate
//!
//! Identity and membership entities shared by every business-network crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-crate types are defined here.
//! - **Parties are keys**: a `Party` is a display name bound to an owning key;
//!   equality covers both.
//! - **Facts are values**: a `MembershipState` revision is immutable. Every
//!   transition produces a new revision with the same `linear_id`.

pub mod entities;
pub mod membership;

pub use entities::*;
pub use membership::*;
