//! Chain-specific types and error definitions.

use std::fmt;

use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::transports::{RpcError, TransportErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// EIP-1193: the user rejected the request.
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-1193: the requested account is not authorized.
pub const UNAUTHORIZED_CODE: i64 = 4100;
/// EIP-1193: the provider is disconnected from all chains.
pub const DISCONNECTED_CODE: i64 = 4900;
/// EIP-1193: the provider is not connected to the requested chain.
pub const CHAIN_DISCONNECTED_CODE: i64 = 4901;
/// EIP-3326: the wallet does not know the requested chain.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;
/// Geth-style `execution reverted` code.
pub const EXECUTION_REVERTED_CODE: i64 = 3;
/// Revert code used by some non-geth nodes.
pub const RPC_REVERT_CODE: i64 = -32015;
/// Generic JSON-RPC server error (insufficient funds, nonce too low, ...).
pub const RPC_SERVER_ERROR_CODE: i64 = -32000;
/// JSON-RPC "transaction rejected".
pub const RPC_TRANSACTION_REJECTED_CODE: i64 = -32003;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Identity of the network a deployment requires.
///
/// Immutable once loaded; handed to wallets verbatim when they have to
/// register the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainDescriptor {
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc_url: String,
    /// Block explorer base URL, without a trailing slash.
    pub explorer_url: String,
    pub native_currency_name: String,
    pub native_currency_symbol: String,
    pub native_currency_decimals: u8,
}

impl Default for ChainDescriptor {
    fn default() -> Self {
        Self {
            chain_id: 420420422,
            chain_name: "Polkadot Hub TestNet".to_string(),
            rpc_url: "https://testnet-passet-hub-eth-rpc.polkadot.io".to_string(),
            explorer_url: "https://blockscout-passet-hub.parity-testnet.parity.io".to_string(),
            native_currency_name: "PAS".to_string(),
            native_currency_symbol: "PAS".to_string(),
            native_currency_decimals: 18,
        }
    }
}

/// `wallet_addEthereumChain` payload (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl ChainDescriptor {
    pub fn id(&self) -> ChainId {
        ChainId(self.chain_id)
    }

    /// Explorer page of a transaction.
    pub fn tx_url(&self, tx_hash: &TxHash) -> String {
        format!("{}/tx/{}", self.explorer_base(), tx_hash)
    }

    /// Explorer page of an account.
    pub fn address_url(&self, address: &Address) -> String {
        format!("{}/address/{}", self.explorer_base(), address)
    }

    fn explorer_base(&self) -> &str {
        self.explorer_url.trim_end_matches('/')
    }

    /// Build the parameters a wallet needs to register this network.
    pub fn add_chain_params(&self) -> AddChainParams {
        let block_explorer_urls = if self.explorer_url.is_empty() {
            Vec::new()
        } else {
            vec![self.explorer_url.clone()]
        };
        AddChainParams {
            chain_id: self.id().to_string(),
            chain_name: self.chain_name.clone(),
            native_currency: NativeCurrency {
                name: self.native_currency_name.clone(),
                symbol: self.native_currency_symbol.clone(),
                decimals: self.native_currency_decimals,
            },
            rpc_urls: vec![self.rpc_url.clone()],
            block_explorer_urls,
        }
    }

    /// Render a base-unit amount in whole native units, e.g. `1.0 PAS`.
    pub fn format_amount(&self, amount: U256) -> String {
        let units = match format_units(amount, self.native_currency_decimals) {
            Ok(units) => trim_fraction(&units),
            Err(_) => amount.to_string(),
        };
        format!("{} {}", units, self.native_currency_symbol)
    }
}

fn trim_fraction(units: &str) -> String {
    match units.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => format!("{}.0", units),
    }
}

/// The two state-changing contract entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Deposit,
    Redeem,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Deposit => "deposit",
            Operation::Redeem => "redeem",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contract call ready to be signed and submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Address,
    /// Native currency attached to the call.
    pub value: U256,
    pub input: Bytes,
}

/// Terminal state of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinedReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    /// `false` when the transaction was mined but reverted.
    pub success: bool,
}

/// Normalized result of a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutcome {
    pub success: bool,
    pub tx_hash: TxHash,
    pub confirmed_block: Option<u64>,
}

/// A wallet, signer or provider failure before classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RawFailure {
    /// JSON-RPC / EIP-1193 error response carrying a numeric code.
    #[error("provider error {code}: {message}")]
    Provider {
        code: i64,
        message: String,
        data: Option<String>,
    },

    /// Failure carrying a symbolic code (e.g. `ACTION_REJECTED`).
    #[error("{code}: {message}")]
    Symbolic { code: String, message: String },

    /// The request never got an answer (connection refused, timeout, bad payload).
    #[error("transport error: {0}")]
    Transport(String),

    /// The transaction was mined with a failed status.
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash, block_number: Option<u64> },

    #[error("{0}")]
    Other(String),
}

impl RawFailure {
    pub fn provider(code: i64, message: impl Into<String>) -> Self {
        RawFailure::Provider {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Numeric code, if the failure carries one.
    pub fn code(&self) -> Option<i64> {
        match self {
            RawFailure::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when a wallet refused a switch because it does not know the chain.
    pub fn is_unrecognized_chain(&self) -> bool {
        self.code() == Some(UNRECOGNIZED_CHAIN_CODE)
    }
}

impl From<RpcError<TransportErrorKind>> for RawFailure {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        match err {
            RpcError::ErrorResp(payload) => RawFailure::Provider {
                code: payload.code,
                message: payload.message.to_string(),
                data: payload.data.as_ref().map(|data| data.get().to_string()),
            },
            RpcError::Transport(kind) => RawFailure::Transport(kind.to_string()),
            RpcError::NullResp => RawFailure::Transport("null response from RPC".to_string()),
            RpcError::DeserError { err, .. } => {
                RawFailure::Transport(format!("malformed RPC response: {}", err))
            }
            other => RawFailure::Other(other.to_string()),
        }
    }
}
