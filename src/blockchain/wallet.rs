//! Wallet capabilities and the embedded key wallet.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//!
//! A wallet is borrowed for one orchestration call at a time. Nothing in the
//! crate stores a `&dyn WalletCapability` beyond the call that received it.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::interval;

use crate::blockchain::types::{
    ChainDescriptor, ChainId, ContractCall, MinedReceipt, RawFailure, UNAUTHORIZED_CODE,
    UNRECOGNIZED_CHAIN_CODE,
};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "DEPOSIT_DESK_PRIVATE_KEY";

/// What the orchestration core needs from a wallet.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    async fn current_chain_id(&self) -> Result<u64, RawFailure>;

    /// Ask the wallet to change network. Unknown networks must fail with
    /// code [`UNRECOGNIZED_CHAIN_CODE`].
    async fn request_switch_chain(&self, chain_id: u64) -> Result<(), RawFailure>;

    /// Ask the wallet to register a network it does not know yet.
    async fn request_add_chain(&self, chain: &ChainDescriptor) -> Result<(), RawFailure>;

    /// Signing capability for `address` on the wallet's current network.
    async fn signer_for(&self, address: Address) -> Result<Arc<dyn TxSigner>, RawFailure>;
}

/// A capability bound to one address that can submit transactions.
#[async_trait]
pub trait TxSigner: Send + Sync {
    fn address(&self) -> Address;

    /// Sign and broadcast `call`, returning the pending transaction's hash.
    async fn send_call(&self, call: ContractCall) -> Result<TxHash, RawFailure>;

    /// Block until `tx_hash` is mined.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<MinedReceipt, RawFailure>;
}

/// Embedded wallet holding one private key and a registry of known networks.
///
/// Behaves like a browser wallet: it is always on exactly one network,
/// refuses to switch to networks it was never told about, and registers
/// new networks on request without switching to them.
#[derive(Debug)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
    networks: RwLock<HashMap<u64, ChainDescriptor>>,
    active_chain: AtomicU64,
    poll_interval: Duration,
}

impl LocalWallet {
    /// Create a wallet from a hex-encoded private key string, starting on `home`.
    ///
    /// # Security
    /// The private key is parsed and stored in memory only. It is never logged.
    pub fn from_private_key(private_key_hex: &str, home: ChainDescriptor) -> Result<Self, RawFailure> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| RawFailure::Other(format!("Invalid private key format: {}", e)))?;

        tracing::info!(
            address = %signer.address(),
            chain_id = home.chain_id,
            "Wallet initialized"
        );

        let active_chain = AtomicU64::new(home.chain_id);
        let networks = HashMap::from([(home.chain_id, home)]);
        Ok(Self {
            signer,
            networks: RwLock::new(networks),
            active_chain,
            poll_interval: Duration::from_secs(2),
        })
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `DEPOSIT_DESK_PRIVATE_KEY` from environment.
    pub fn from_env(home: ChainDescriptor) -> Result<Self, RawFailure> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            RawFailure::Other(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key, home)
    }

    /// Receipt polling interval used by signers this wallet hands out.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Whether `chain_id` has been registered with this wallet.
    pub fn knows_chain(&self, chain_id: u64) -> bool {
        self.networks
            .read()
            .map(|networks| networks.contains_key(&chain_id))
            .unwrap_or(false)
    }

    fn active_network(&self) -> Result<ChainDescriptor, RawFailure> {
        let active = self.active_chain.load(Ordering::SeqCst);
        let networks = self
            .networks
            .read()
            .map_err(|_| RawFailure::Other("wallet network registry poisoned".to_string()))?;
        networks.get(&active).cloned().ok_or_else(|| {
            RawFailure::provider(UNRECOGNIZED_CHAIN_CODE, format!("Unrecognized chain ID {}", ChainId(active)))
        })
    }
}

#[async_trait]
impl WalletCapability for LocalWallet {
    async fn current_chain_id(&self) -> Result<u64, RawFailure> {
        Ok(self.active_chain.load(Ordering::SeqCst))
    }

    async fn request_switch_chain(&self, chain_id: u64) -> Result<(), RawFailure> {
        if !self.knows_chain(chain_id) {
            return Err(RawFailure::provider(
                UNRECOGNIZED_CHAIN_CODE,
                format!(
                    "Unrecognized chain ID \"{}\". Try adding the chain using wallet_addEthereumChain first.",
                    ChainId(chain_id)
                ),
            ));
        }
        self.active_chain.store(chain_id, Ordering::SeqCst);
        tracing::info!(chain_id, "Wallet switched network");
        Ok(())
    }

    async fn request_add_chain(&self, chain: &ChainDescriptor) -> Result<(), RawFailure> {
        let mut networks = self
            .networks
            .write()
            .map_err(|_| RawFailure::Other("wallet network registry poisoned".to_string()))?;
        networks.insert(chain.chain_id, chain.clone());
        tracing::info!(chain_id = chain.chain_id, chain_name = %chain.chain_name, "Wallet registered network");
        Ok(())
    }

    async fn signer_for(&self, address: Address) -> Result<Arc<dyn TxSigner>, RawFailure> {
        if address != self.address() {
            return Err(RawFailure::provider(
                UNAUTHORIZED_CODE,
                format!("Account {} is not managed by this wallet", address),
            ));
        }
        let network = self.active_network()?;
        let signer = RpcSigner::connect(self.signer.clone(), &network.rpc_url, self.poll_interval)?;
        Ok(Arc::new(signer))
    }
}

/// Signer submitting through a JSON-RPC node with a local key.
pub struct RpcSigner {
    address: Address,
    provider: Arc<dyn Provider + Send + Sync>,
    poll_interval: Duration,
}

impl RpcSigner {
    pub fn connect(
        signer: PrivateKeySigner,
        rpc_url: &str,
        poll_interval: Duration,
    ) -> Result<Self, RawFailure> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| RawFailure::Other(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url);
        Ok(Self {
            address,
            provider: Arc::new(provider),
            poll_interval,
        })
    }
}

#[async_trait]
impl TxSigner for RpcSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_call(&self, call: ContractCall) -> Result<TxHash, RawFailure> {
        // Gas, nonce and chain id are filled by the provider from the node.
        let tx = TransactionRequest::default()
            .with_from(self.address)
            .with_to(call.to)
            .with_value(call.value)
            .with_input(call.input);

        let pending = self.provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<MinedReceipt, RawFailure> {
        let mut ticker = interval(self.poll_interval);
        loop {
            ticker.tick().await;

            let receipt = match self.provider.get_transaction_receipt(tx_hash).await? {
                Some(r) => r,
                None => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    continue;
                }
            };

            return Ok(MinedReceipt {
                tx_hash,
                block_number: receipt.block_number,
                success: receipt.status(),
            });
        }
    }
}
