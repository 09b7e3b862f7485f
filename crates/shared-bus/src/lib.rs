//! # Shared Bus - Session Messaging Between Parties
//!
//! Point-to-point, ordered, reliable sessions between two parties running one
//! protocol. Opening a session toward a party spawns that party's registered
//! responder with the other end.
//!
//! ```text
//! ┌──────────────┐   open_session()   ┌──────────────────┐
//! │  Initiator   │ ─────────────────▶ │ Session Network  │
//! │  (party A)   │                    │                  │
//! └──────┬───────┘                    └────────┬─────────┘
//!        │ send / receive                      │ spawn accept()
//!        ▼                                     ▼
//!   ProtocolSession  ◀═══ ordered frames ═══▶ ProtocolSession
//!                                           (party B responder)
//! ```
//!
//! ## Guarantees
//!
//! - **Ordering:** every frame carries a per-direction sequence number that
//!   the receiver checks.
//! - **Envelope identity:** the sender recorded in the envelope must be the
//!   session counterparty.
//! - **Failure propagation:** a responder can end the session with an error
//!   frame. The initiator sees its reason text.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod envelope;
pub mod errors;
pub mod network;
pub mod session;

// Re-export main types
pub use envelope::{SessionEnvelope, SessionFrame, SessionId};
pub use errors::{SessionError, SessionResult};
pub use network::{InMemorySessionNetwork, SessionAcceptor, SessionConfig, SessionMessaging};
pub use session::{ProtocolId, ProtocolSession};

/// Current protocol version for session envelopes.
pub const PROTOCOL_VERSION: u16 = 1;

/// Default time a `receive` waits before giving up.
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 30_000;
