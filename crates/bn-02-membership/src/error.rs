//! Error types for the membership subsystem

use crate::domain::policy::ManagementAction;
use bn_01_ledger::LedgerError;
use shared_bus::SessionError;
use shared_types::UniqueIdentifier;
use std::fmt;
use thiserror::Error;

/// Which end of a protocol run a check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The party that started the transition.
    Initiator,
    /// The party a request was addressed to.
    Receiver,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiator => f.write_str("Initiator"),
            Self::Receiver => f.write_str("Receiver"),
        }
    }
}

/// Coarse classification for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Local state does not allow the transition.
    Precondition,
    /// The policy denied the acting party.
    Authorization,
    /// A transaction or message failed structural checks.
    Validation,
    /// Records needed for consistency are missing or incomplete.
    Integrity,
    /// The session failed.
    Transport,
    /// The counterparty refused; its reason is kept verbatim.
    Counterparty,
}

/// Membership subsystem errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MembershipError {
    #[error("Initiator is already a member of Business Network with {network_id} ID")]
    AlreadyMember { network_id: String },

    #[error("Business Network with {network_id} ID already exists")]
    NetworkAlreadyExists { network_id: String },

    #[error("{side} is not member of a business network")]
    NotMember { side: Side },

    #[error("{side}'s membership is not active")]
    MembershipNotActive { side: Side },

    #[error("{side} is not authorised to {action}")]
    NotAuthorised { side: Side, action: ManagementAction },

    #[error("Membership state with {linear_id} linear ID doesn't exist")]
    MembershipNotFound { linear_id: UniqueIdentifier },

    #[error("{reason}")]
    InvalidTransition { reason: String },

    /// Local re-validation of a proposed transaction failed.
    #[error("{reason}")]
    ProposalRejected { reason: String },

    #[error("Unsupported membership protocol {protocol}")]
    UnsupportedProtocol { protocol: String },

    #[error(transparent)]
    Ledger(LedgerError),

    #[error("Transaction for membership with {linear_id} ID doesn't exist")]
    CommitmentRecordNotFound { linear_id: UniqueIdentifier },

    #[error("Membership sync announced {announced} records but only {received} arrived")]
    SyncDesync { announced: u32, received: u32 },

    #[error("Membership sync announced {announced} records, limit is {limit}")]
    SyncLimitExceeded { announced: u32, limit: u32 },

    #[error("Membership sync of {records} records cannot be announced")]
    SyncTooLarge { records: usize },

    /// The counterparty failed. Display is its reason.
    #[error("{reason}")]
    CounterpartyRejected { counterparty: String, reason: String },

    #[error(transparent)]
    Session(SessionError),
}

impl MembershipError {
    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AlreadyMember { .. }
            | Self::NetworkAlreadyExists { .. }
            | Self::NotMember { .. }
            | Self::MembershipNotActive { .. }
            | Self::MembershipNotFound { .. }
            | Self::InvalidTransition { .. } => ErrorCategory::Precondition,
            Self::NotAuthorised { .. } => ErrorCategory::Authorization,
            Self::ProposalRejected { .. } | Self::UnsupportedProtocol { .. } | Self::Ledger(_) => {
                ErrorCategory::Validation
            }
            Self::CommitmentRecordNotFound { .. }
            | Self::SyncDesync { .. }
            | Self::SyncLimitExceeded { .. }
            | Self::SyncTooLarge { .. } => ErrorCategory::Integrity,
            Self::Session(_) => ErrorCategory::Transport,
            Self::CounterpartyRejected { .. } => ErrorCategory::Counterparty,
        }
    }

    /// Whether the counterparty already knows about this failure: it either
    /// reported it or left the session.
    pub fn originated_remotely(&self) -> bool {
        matches!(
            self,
            Self::CounterpartyRejected { .. } | Self::Session(SessionError::Closed { .. })
        )
    }
}

impl From<SessionError> for MembershipError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::CounterpartyFailure {
                counterparty,
                reason,
            } => Self::CounterpartyRejected {
                counterparty,
                reason,
            },
            other => Self::Session(other),
        }
    }
}

impl From<LedgerError> for MembershipError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Session(session) => session.into(),
            LedgerError::TransactionRejected { reason } => Self::ProposalRejected { reason },
            other => Self::Ledger(other),
        }
    }
}

/// Result type for membership operations
pub type MembershipResult<T> = Result<T, MembershipError>;
