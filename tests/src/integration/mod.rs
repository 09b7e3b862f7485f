//! Integration flows across several nodes

pub mod harness;

mod lifecycle;
mod management;
mod membership_sync;
mod request_membership;
