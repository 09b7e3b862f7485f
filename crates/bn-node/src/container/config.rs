//! # Node Configuration
//!
//! Plain structs with defaults, overridden from `BN_*` environment variables.
//!
//! ## Rules
//!
//! - An unknown membership policy is fatal at start-up
//! - Malformed numbers and key seeds are logged and the default is kept

use bn_02_membership::{MembershipServiceConfig, PolicyKind, UnknownPolicy};
use shared_bus::SessionConfig;
use shared_crypto::CryptoError;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const NODE_NAME_VAR: &str = "BN_NODE_NAME";
pub const KEY_SEED_VAR: &str = "BN_KEY_SEED";
pub const POLICY_VAR: &str = "BN_POLICY";
pub const RECEIVE_TIMEOUT_VAR: &str = "BN_RECEIVE_TIMEOUT_MS";
pub const MAX_SYNC_RECORDS_VAR: &str = "BN_MAX_SYNC_RECORDS";
pub const LOG_LEVEL_VAR: &str = "BN_LOG_LEVEL";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Who this node signs as.
    pub identity: NodeIdentityConfig,
    /// Membership policy and sync limits.
    pub membership: MembershipConfig,
    /// Session substrate settings.
    pub messaging: MessagingConfig,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            identity: NodeIdentityConfig::default(),
            membership: MembershipConfig::default(),
            messaging: MessagingConfig::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by whatever `lookup` returns for each `BN_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup(NODE_NAME_VAR) {
            config.identity.name = name;
        }

        if let Some(seed) = lookup(KEY_SEED_VAR) {
            match hex::decode(seed.trim()) {
                Ok(bytes) if bytes.len() == 32 => {
                    config.identity.key_seed = Some(seed.trim().to_string());
                    info!("[bn-node] Loaded key seed from environment");
                }
                _ => warn!("[bn-node] {KEY_SEED_VAR} must be 32 bytes (64 hex chars)"),
            }
        }

        if let Some(policy) = lookup(POLICY_VAR) {
            config.membership.policy = policy.parse()?;
        }

        if let Some(timeout) = lookup(RECEIVE_TIMEOUT_VAR) {
            match timeout.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.messaging.receive_timeout = Duration::from_millis(ms),
                _ => warn!(value = %timeout, "[bn-node] Ignoring invalid {RECEIVE_TIMEOUT_VAR}"),
            }
        }

        if let Some(limit) = lookup(MAX_SYNC_RECORDS_VAR) {
            match limit.trim().parse::<u32>() {
                Ok(n) => config.membership.max_sync_records = n,
                Err(_) => warn!(value = %limit, "[bn-node] Ignoring invalid {MAX_SYNC_RECORDS_VAR}"),
            }
        }

        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            config.log_level = level;
        }

        Ok(config)
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    NodeConfig::from_lookup(|key| std::env::var(key).ok())
}

/// Node identity.
#[derive(Debug, Clone)]
pub struct NodeIdentityConfig {
    /// Party name, e.g. `O=BNO, L=London, C=GB`.
    pub name: String,
    /// Hex-encoded 32-byte signing key seed. Derived from the name when unset.
    pub key_seed: Option<String>,
}

impl Default for NodeIdentityConfig {
    fn default() -> Self {
        Self {
            name: "O=BNO, L=London, C=GB".to_string(),
            key_seed: None,
        }
    }
}

/// Membership subsystem configuration.
#[derive(Debug, Clone)]
pub struct MembershipConfig {
    /// Authorization policy.
    pub policy: PolicyKind,
    /// Most records accepted in one membership sync.
    pub max_sync_records: u32,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            max_sync_records: MembershipServiceConfig::default().max_sync_records,
        }
    }
}

impl MembershipConfig {
    pub fn service_config(&self) -> MembershipServiceConfig {
        MembershipServiceConfig {
            max_sync_records: self.max_sync_records,
        }
    }
}

/// Session substrate configuration.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    /// How long a session receive waits.
    pub receive_timeout: Duration,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            receive_timeout: SessionConfig::default().receive_timeout,
        }
    }
}

impl MessagingConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            receive_timeout: self.receive_timeout,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Policy(#[from] UnknownPolicy),

    #[error("Invalid key seed: {0}")]
    KeySeed(#[from] CryptoError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.membership.policy, PolicyKind::PublicDecentralised);
        assert_eq!(config.membership.max_sync_records, 10_000);
        assert_eq!(config.messaging.receive_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, "info");
        assert!(config.identity.key_seed.is_none());
    }

    #[test]
    fn test_overrides() {
        let seed = "11".repeat(32);
        let config = NodeConfig::from_lookup(lookup(&[
            (NODE_NAME_VAR, "O=Bank, L=Paris, C=FR"),
            (KEY_SEED_VAR, &seed),
            (POLICY_VAR, "role-based"),
            (RECEIVE_TIMEOUT_VAR, "500"),
            (MAX_SYNC_RECORDS_VAR, "25"),
            (LOG_LEVEL_VAR, "debug"),
        ]))
        .unwrap();

        assert_eq!(config.identity.name, "O=Bank, L=Paris, C=FR");
        assert_eq!(config.identity.key_seed.as_deref(), Some(seed.as_str()));
        assert_eq!(config.membership.policy, PolicyKind::RoleBased);
        assert_eq!(config.messaging.receive_timeout, Duration::from_millis(500));
        assert_eq!(config.membership.max_sync_records, 25);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_unknown_policy_is_fatal() {
        let err = NodeConfig::from_lookup(lookup(&[(POLICY_VAR, "anarchy")])).unwrap_err();
        assert!(matches!(err, ConfigError::Policy(_)));
    }

    #[test]
    fn test_malformed_values_keep_defaults() {
        let config = NodeConfig::from_lookup(lookup(&[
            (KEY_SEED_VAR, "abcd"),
            (RECEIVE_TIMEOUT_VAR, "soon"),
            (MAX_SYNC_RECORDS_VAR, "-1"),
        ]))
        .unwrap();
        assert!(config.identity.key_seed.is_none());
        assert_eq!(config.messaging.receive_timeout, Duration::from_secs(30));
        assert_eq!(config.membership.max_sync_records, 10_000);
    }
}
