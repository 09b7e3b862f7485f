//! # Session Envelope
//!
//! Every frame on a session travels in a `SessionEnvelope`. The receiver
//! checks version, session id, sender and sequence before it looks at the
//! frame.

use serde::{Deserialize, Serialize};
use shared_types::Party;
use std::fmt;

/// Identifies one session between two parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// What a frame carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionFrame {
    /// A bincode-encoded protocol message.
    Data(Vec<u8>),
    /// The sender failed. The session ends after this frame.
    Failure(String),
}

/// Header plus frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEnvelope {
    /// Protocol version for forward compatibility.
    pub version: u16,
    /// Session the frame belongs to.
    pub session_id: SessionId,
    /// Sending party. Must equal the receiver's counterparty.
    pub sender: Party,
    /// Per-direction sequence number, starting at zero.
    pub sequence: u64,
    /// Payload.
    pub frame: SessionFrame,
}
