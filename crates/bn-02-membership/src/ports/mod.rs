//! Ports module for the membership subsystem

pub mod inbound;
pub mod outbound;

pub use inbound::MembershipManagementApi;
pub use outbound::MembershipStore;
