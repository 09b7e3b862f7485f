//! Session error types.

use thiserror::Error;

/// Errors from session operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No responder is registered for the party.
    #[error("No responder registered for party {party}")]
    UnknownParty {
        /// Name of the unreachable party.
        party: String,
    },

    /// The counterparty ended the session.
    #[error("Session with {counterparty} closed")]
    Closed {
        /// Counterparty name.
        counterparty: String,
    },

    /// Nothing arrived within the receive timeout.
    #[error("Timed out after {after_ms}ms waiting for {counterparty}")]
    Timeout {
        /// Counterparty name.
        counterparty: String,
        /// Configured timeout.
        after_ms: u64,
    },

    /// The counterparty failed and reported why. Display is the reason itself.
    #[error("{reason}")]
    CounterpartyFailure {
        /// Counterparty name.
        counterparty: String,
        /// Reason reported by the counterparty.
        reason: String,
    },

    /// Payload could not be encoded.
    #[error("Failed to encode payload: {0}")]
    Encode(String),

    /// Payload could not be decoded as the expected type.
    #[error("Failed to decode payload from {counterparty}: {reason}")]
    Decode {
        /// Counterparty name.
        counterparty: String,
        /// Decoder message.
        reason: String,
    },

    /// Envelope did not match the session (version, id, sender or sequence).
    #[error("Protocol violation on session with {counterparty}: {reason}")]
    ProtocolViolation {
        /// Counterparty name.
        counterparty: String,
        /// What was wrong.
        reason: String,
    },
}

/// Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
