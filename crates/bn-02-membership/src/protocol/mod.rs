//! Multi-party protocols run over sessions
//!
//! Every transition other than `Create` runs as one protocol, identified by
//! its `ProtocolId`. The responder of each party dispatches on that id.

pub mod finalisation;
pub mod sync;
pub mod validation;

use serde::{Deserialize, Serialize};
use shared_bus::ProtocolId;
use shared_types::TransitionCommand;

pub const REQUEST_MEMBERSHIP: ProtocolId = ProtocolId::new("bn.membership.request");
pub const ACTIVATE_MEMBERSHIP: ProtocolId = ProtocolId::new("bn.membership.activate");
pub const SUSPEND_MEMBERSHIP: ProtocolId = ProtocolId::new("bn.membership.suspend");
pub const REVOKE_MEMBERSHIP: ProtocolId = ProtocolId::new("bn.membership.revoke");
pub const MODIFY_ROLES: ProtocolId = ProtocolId::new("bn.membership.modify-roles");

/// Protocol that carries `command`. `Create` involves no counterparty.
pub fn protocol_for(command: TransitionCommand) -> Option<ProtocolId> {
    match command {
        TransitionCommand::Create => None,
        TransitionCommand::Request => Some(REQUEST_MEMBERSHIP),
        TransitionCommand::Activate => Some(ACTIVATE_MEMBERSHIP),
        TransitionCommand::Suspend => Some(SUSPEND_MEMBERSHIP),
        TransitionCommand::Revoke => Some(REVOKE_MEMBERSHIP),
        TransitionCommand::ModifyRoles => Some(MODIFY_ROLES),
    }
}

/// Command a protocol proposes.
pub fn command_for(protocol: ProtocolId) -> Option<TransitionCommand> {
    [
        TransitionCommand::Request,
        TransitionCommand::Activate,
        TransitionCommand::Suspend,
        TransitionCommand::Revoke,
        TransitionCommand::ModifyRoles,
    ]
    .into_iter()
    .find(|command| protocol_for(*command) == Some(protocol))
}

/// First message of a membership request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRequest {
    pub network_id: String,
}

/// A non-signing observer passed its local checks and waits for the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverReady;
