//! # Session Network
//!
//! Routes session openings to the responder registered for the target party.

use crate::envelope::SessionId;
use crate::errors::{SessionError, SessionResult};
use crate::session::{ProtocolId, ProtocolSession};
use crate::DEFAULT_RECEIVE_TIMEOUT_MS;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Party;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Responder side of a party: handles sessions opened toward it.
#[async_trait]
pub trait SessionAcceptor: Send + Sync {
    /// Run the responder for `session.protocol()`. Failures should be
    /// reported to the counterparty with `send_error`.
    async fn accept(&self, session: ProtocolSession);
}

/// Opening sessions toward other parties.
pub trait SessionMessaging: Send + Sync {
    /// Open a session from `initiator` to `counterparty` for `protocol`.
    ///
    /// The counterparty's responder starts running immediately.
    fn open_session(
        &self,
        initiator: &Party,
        counterparty: &Party,
        protocol: ProtocolId,
    ) -> SessionResult<ProtocolSession>;
}

/// Session network settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long `receive` waits for the next frame.
    pub receive_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            receive_timeout: Duration::from_millis(DEFAULT_RECEIVE_TIMEOUT_MS),
        }
    }
}

/// In-process session network. Each opened session spawns the target's
/// responder on the current tokio runtime.
pub struct InMemorySessionNetwork {
    /// Registered responders by party.
    acceptors: RwLock<HashMap<Party, Arc<dyn SessionAcceptor>>>,

    /// Next session id.
    next_session_id: AtomicU64,

    /// Total sessions opened.
    sessions_opened: AtomicU64,

    config: SessionConfig,
}

impl InMemorySessionNetwork {
    /// Network with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Network with the given settings.
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            acceptors: RwLock::new(HashMap::new()),
            next_session_id: AtomicU64::new(1),
            sessions_opened: AtomicU64::new(0),
            config,
        }
    }

    /// Route sessions for `party` to `acceptor`, replacing any previous one.
    pub fn register(&self, party: Party, acceptor: Arc<dyn SessionAcceptor>) {
        debug!(party = %party, "Responder registered");
        if self.acceptors.write().insert(party.clone(), acceptor).is_some() {
            warn!(party = %party, "Replaced existing responder");
        }
    }

    /// Total sessions opened so far.
    #[must_use]
    pub fn sessions_opened(&self) -> u64 {
        self.sessions_opened.load(Ordering::Relaxed)
    }

    /// Active settings.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl Default for InMemorySessionNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMessaging for InMemorySessionNetwork {
    fn open_session(
        &self,
        initiator: &Party,
        counterparty: &Party,
        protocol: ProtocolId,
    ) -> SessionResult<ProtocolSession> {
        let acceptor = self
            .acceptors
            .read()
            .get(counterparty)
            .cloned()
            .ok_or_else(|| SessionError::UnknownParty {
                party: counterparty.name().to_string(),
            })?;

        let id = SessionId(self.next_session_id.fetch_add(1, Ordering::Relaxed));
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);

        let (local, remote) = ProtocolSession::pair(
            id,
            protocol,
            initiator.clone(),
            counterparty.clone(),
            self.config.receive_timeout,
        );

        debug!(
            session = %id,
            protocol = %protocol,
            initiator = %initiator,
            counterparty = %counterparty,
            "Session opened"
        );

        tokio::spawn(async move {
            acceptor.accept(remote).await;
        });

        Ok(local)
    }
}
