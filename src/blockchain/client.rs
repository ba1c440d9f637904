//! Read-only blockchain RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint(s) of the target chain
//! - Query chain state and the deposit contract's views
//! - Handle timeouts and network errors gracefully
//! - Provide health check for blockchain connectivity

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::contract::{DepositContract, IEventDeposit};
use crate::blockchain::types::{ChainDescriptor, ChainId, RawFailure};
use crate::config::ChainConfig;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct ChainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    chain: ChainDescriptor,
    contract: Address,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a new client for `contract` on the configured chain.
    ///
    /// Does not touch the network; an unreachable RPC only shows up on first use.
    pub fn new(config: &ChainConfig, contract: Address) -> Result<Self, RawFailure> {
        let mut providers = Vec::new();

        let primary_url: url::Url = config.descriptor.rpc_url.parse().map_err(|e| {
            RawFailure::Other(format!(
                "Invalid RPC URL '{}': {}",
                config.descriptor.rpc_url, e
            ))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url))
                as Arc<dyn Provider + Send + Sync>,
        );

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url))
                        as Arc<dyn Provider + Send + Sync>,
                );
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::info!(
            rpc_url = %config.descriptor.rpc_url,
            chain_id = config.descriptor.chain_id,
            contract = %contract,
            failovers = providers.len() - 1,
            "Chain client initialized"
        );

        Ok(Self {
            providers,
            chain: config.descriptor.clone(),
            contract,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
        })
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> Result<ChainId, RawFailure> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_chain_id()).await {
                Ok(Ok(result)) => return Ok(ChainId(result)),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(RawFailure::Transport("All RPC providers failed".to_string()))
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> Result<u64, RawFailure> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_block_number()).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(RawFailure::Transport(
            "All providers failed to get block number".to_string(),
        ))
    }

    /// Check if the blockchain is reachable and on the configured chain.
    pub async fn is_healthy(&self) -> bool {
        matches!(self.get_chain_id().await, Ok(id) if id.0 == self.chain.chain_id)
    }

    /// `eth_call` against the contract.
    ///
    /// An error response from a node is final (the call itself failed);
    /// only transport failures and timeouts move on to the next provider.
    async fn call_view(&self, input: Vec<u8>) -> Result<Bytes, RawFailure> {
        let request = TransactionRequest::default()
            .with_to(self.contract)
            .with_input(Bytes::from(input));

        let mut last_failure = RawFailure::Transport("No RPC providers configured".to_string());
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.call(request.clone())).await {
                Ok(Ok(bytes)) => return Ok(bytes),
                Ok(Err(e)) => {
                    let failure = RawFailure::from(e);
                    if failure.code().is_some() {
                        return Err(failure);
                    }
                    tracing::warn!(provider_idx = i, error = %failure, "RPC error, trying next provider");
                    last_failure = failure;
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                    last_failure = RawFailure::Transport(format!(
                        "RPC timeout after {} seconds",
                        self.timeout_duration.as_secs()
                    ));
                }
            }
        }
        Err(last_failure)
    }

    async fn view<C: SolCall>(&self, call: C) -> Result<C::Return, RawFailure> {
        let output = self.call_view(call.abi_encode()).await?;
        C::abi_decode_returns(&output)
            .map_err(|e| RawFailure::Other(format!("Failed to decode {}: {}", C::SIGNATURE, e)))
    }

    /// Chain this client reads from.
    pub fn chain(&self) -> &ChainDescriptor {
        &self.chain
    }
}

#[async_trait]
impl DepositContract for ChainClient {
    fn address(&self) -> Address {
        self.contract
    }

    async fn deposit_amount(&self) -> Result<U256, RawFailure> {
        self.view(IEventDeposit::DEPOSIT_AMOUNTCall {}).await
    }

    async fn has_deposited(&self, user: Address) -> Result<bool, RawFailure> {
        self.view(IEventDeposit::hasDepositedCall { _user: user }).await
    }

    async fn admin(&self) -> Result<Address, RawFailure> {
        self.view(IEventDeposit::adminCall {}).await
    }

    async fn redemption_deadline(&self) -> Result<u64, RawFailure> {
        let deadline = self.view(IEventDeposit::REDEMPTION_DEADLINECall {}).await?;
        Ok(deadline.saturating_to::<u64>())
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.chain.rpc_url)
            .field("chain_id", &self.chain.chain_id)
            .field("contract", &self.contract)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
