//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

pub use crate::blockchain::types::ChainDescriptor;

/// Root configuration for the deposit service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// The one network this deployment targets.
    pub chain: ChainConfig,

    /// Deposit contract location.
    pub contract: ContractConfig,

    /// Registration store backing file.
    pub storage: StorageConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Target network plus RPC client tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Network identity handed to wallets.
    #[serde(flatten)]
    pub descriptor: ChainDescriptor,

    /// Failover JSON-RPC endpoint URLs for read-only calls.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds (read-only calls only).
    pub rpc_timeout_secs: u64,

    /// Receipt polling interval while waiting for a transaction to be mined.
    pub confirmation_poll_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            descriptor: ChainDescriptor::default(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
            confirmation_poll_ms: 2_000,
        }
    }
}

/// Deposit contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Contract address (hex, 0x-prefixed).
    pub address: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: "0x81481f719A69a564A05c588260A37805e091fd67".to_string(),
        }
    }
}

/// Registration store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON file holding every registration.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "storage.json".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.chain.descriptor.chain_id, 420420422);
        assert_eq!(config.storage.path, "storage.json");
    }

    #[test]
    fn test_chain_section_is_flattened() {
        let config: AppConfig = toml::from_str(
            r#"
            [chain]
            chain_id = 31337
            chain_name = "Anvil"
            rpc_url = "http://localhost:8545"
            rpc_timeout_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.chain.descriptor.chain_id, 31337);
        assert_eq!(config.chain.descriptor.chain_name, "Anvil");
        assert_eq!(config.chain.rpc_timeout_secs, 3);
        // Fields not given keep the descriptor defaults
        assert_eq!(config.chain.descriptor.native_currency_symbol, "PAS");
    }
}
