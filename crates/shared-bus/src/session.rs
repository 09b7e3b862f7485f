//! # Protocol Session
//!
//! One end of a bidirectional channel between two parties for the lifetime
//! of one protocol run. Dropping a session closes it.

use crate::envelope::{SessionEnvelope, SessionFrame, SessionId};
use crate::errors::{SessionError, SessionResult};
use crate::PROTOCOL_VERSION;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::Party;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace};

/// Name of the protocol a session was opened for. Responders dispatch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolId(&'static str);

impl ProtocolId {
    /// Protocol called `name`.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The protocol name.
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

struct Inbound {
    receiver: mpsc::UnboundedReceiver<SessionEnvelope>,
    next_sequence: u64,
}

/// One end of a session.
pub struct ProtocolSession {
    id: SessionId,
    protocol: ProtocolId,
    local: Party,
    counterparty: Party,
    outbound: mpsc::UnboundedSender<SessionEnvelope>,
    inbound: Mutex<Inbound>,
    next_send_sequence: AtomicU64,
    receive_timeout: Duration,
}

impl ProtocolSession {
    /// Create both ends of a session between `initiator` and `responder`.
    pub(crate) fn pair(
        id: SessionId,
        protocol: ProtocolId,
        initiator: Party,
        responder: Party,
        receive_timeout: Duration,
    ) -> (ProtocolSession, ProtocolSession) {
        let (to_responder, responder_inbox) = mpsc::unbounded_channel();
        let (to_initiator, initiator_inbox) = mpsc::unbounded_channel();

        let initiator_end = ProtocolSession::new(
            id,
            protocol,
            initiator.clone(),
            responder.clone(),
            to_responder,
            initiator_inbox,
            receive_timeout,
        );
        let responder_end = ProtocolSession::new(
            id,
            protocol,
            responder,
            initiator,
            to_initiator,
            responder_inbox,
            receive_timeout,
        );
        (initiator_end, responder_end)
    }

    fn new(
        id: SessionId,
        protocol: ProtocolId,
        local: Party,
        counterparty: Party,
        outbound: mpsc::UnboundedSender<SessionEnvelope>,
        receiver: mpsc::UnboundedReceiver<SessionEnvelope>,
        receive_timeout: Duration,
    ) -> Self {
        Self {
            id,
            protocol,
            local,
            counterparty,
            outbound,
            inbound: Mutex::new(Inbound {
                receiver,
                next_sequence: 0,
            }),
            next_send_sequence: AtomicU64::new(0),
            receive_timeout,
        }
    }

    /// Session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Protocol this session runs.
    pub fn protocol(&self) -> ProtocolId {
        self.protocol
    }

    /// Our side.
    pub fn local(&self) -> &Party {
        &self.local
    }

    /// The other side.
    pub fn counterparty(&self) -> &Party {
        &self.counterparty
    }

    /// Send `value` to the counterparty.
    ///
    /// If the counterparty already ended the session, any failure it reported
    /// before leaving is returned instead of a bare `Closed`.
    pub async fn send<T: Serialize + ?Sized>(&self, value: &T) -> SessionResult<()> {
        let payload = bincode::serialize(value).map_err(|e| SessionError::Encode(e.to_string()))?;
        trace!(session = %self.id, counterparty = %self.counterparty, bytes = payload.len(), "send");
        self.push(SessionFrame::Data(payload)).await
    }

    /// Receive the next message as `T`.
    pub async fn receive<T: DeserializeOwned>(&self) -> SessionResult<T> {
        let mut inbound = self.inbound.lock().await;

        let envelope = match tokio::time::timeout(self.receive_timeout, inbound.receiver.recv()).await
        {
            Err(_) => {
                return Err(SessionError::Timeout {
                    counterparty: self.counterparty.name().to_string(),
                    after_ms: self.receive_timeout.as_millis() as u64,
                })
            }
            Ok(None) => return Err(self.closed()),
            Ok(Some(envelope)) => envelope,
        };

        self.check_envelope(&envelope, inbound.next_sequence)?;
        inbound.next_sequence += 1;

        match envelope.frame {
            SessionFrame::Data(bytes) => {
                bincode::deserialize(&bytes).map_err(|e| SessionError::Decode {
                    counterparty: self.counterparty.name().to_string(),
                    reason: e.to_string(),
                })
            }
            SessionFrame::Failure(reason) => Err(SessionError::CounterpartyFailure {
                counterparty: self.counterparty.name().to_string(),
                reason,
            }),
        }
    }

    /// Tell the counterparty this side failed. Best effort: a counterparty that
    /// already left is ignored.
    pub async fn send_error(&self, reason: impl Into<String>) {
        let reason = reason.into();
        debug!(session = %self.id, counterparty = %self.counterparty, %reason, "sending failure frame");
        let sequence = self.next_send_sequence.fetch_add(1, Ordering::SeqCst);
        let _ = self.outbound.send(self.envelope(sequence, SessionFrame::Failure(reason)));
    }

    async fn push(&self, frame: SessionFrame) -> SessionResult<()> {
        let sequence = self.next_send_sequence.fetch_add(1, Ordering::SeqCst);
        if self.outbound.send(self.envelope(sequence, frame)).is_ok() {
            return Ok(());
        }

        // The counterparty is gone. Surface its failure frame if it left one.
        let mut inbound = self.inbound.lock().await;
        while let Ok(envelope) = inbound.receiver.try_recv() {
            if let SessionFrame::Failure(reason) = envelope.frame {
                return Err(SessionError::CounterpartyFailure {
                    counterparty: self.counterparty.name().to_string(),
                    reason,
                });
            }
        }
        Err(self.closed())
    }

    fn envelope(&self, sequence: u64, frame: SessionFrame) -> SessionEnvelope {
        SessionEnvelope {
            version: PROTOCOL_VERSION,
            session_id: self.id,
            sender: self.local.clone(),
            sequence,
            frame,
        }
    }

    fn check_envelope(&self, envelope: &SessionEnvelope, expected_sequence: u64) -> SessionResult<()> {
        let violation = if envelope.version != PROTOCOL_VERSION {
            Some(format!(
                "unsupported version {} (supported {})",
                envelope.version, PROTOCOL_VERSION
            ))
        } else if envelope.session_id != self.id {
            Some(format!("frame for {} arrived on {}", envelope.session_id, self.id))
        } else if envelope.sender != self.counterparty {
            Some(format!("frame sent by {}", envelope.sender))
        } else if envelope.sequence != expected_sequence {
            Some(format!(
                "sequence {} received, {} expected",
                envelope.sequence, expected_sequence
            ))
        } else {
            None
        };

        match violation {
            Some(reason) => Err(SessionError::ProtocolViolation {
                counterparty: self.counterparty.name().to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn closed(&self) -> SessionError {
        SessionError::Closed {
            counterparty: self.counterparty.name().to_string(),
        }
    }
}

impl fmt::Debug for ProtocolSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolSession")
            .field("id", &self.id)
            .field("protocol", &self.protocol)
            .field("local", &self.local)
            .field("counterparty", &self.counterparty)
            .finish()
    }
}
