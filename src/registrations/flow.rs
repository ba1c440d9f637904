//! End-to-end deposit and redeem flows.
//!
//! # Data Flow
//! ```text
//! deposit: ensure_network → hasDeposited pre-check → signer → execute(Deposit) → store.upsert
//! redeem:  prepare_redemption → ensure_network → signer → execute(Redeem) → store.delete (best-effort)
//! ```
//!
//! Each step is awaited in order; the only concurrent pair is the
//! eligibility read inside `prepare_redemption`.

use alloy::primitives::Address;
use serde::Serialize;
use std::sync::Arc;

use crate::blockchain::classify::{ClassifiedError, ErrorKind};
use crate::blockchain::contract::{contract_info, ContractInfo, DepositContract};
use crate::blockchain::network::ensure_network;
use crate::blockchain::transaction::TransactionExecutor;
use crate::blockchain::types::{ChainDescriptor, Operation, TransactionOutcome};
use crate::blockchain::wallet::WalletCapability;
use crate::registrations::redemption::{complete_redemption, prepare_redemption};
use crate::registrations::store::RegistrationStore;
use crate::registrations::types::{address_key, RegistrationForm, RegistrationRecord};

/// Result of a confirmed deposit that was also recorded locally.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositReceipt {
    pub outcome: TransactionOutcome,
    pub registration: RegistrationRecord,
    pub explorer_url: String,
}

/// Result of a confirmed redemption.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionReceipt {
    pub outcome: TransactionOutcome,
    /// Registration the redemption was made against (possibly a placeholder).
    pub registration: RegistrationRecord,
    pub explorer_url: String,
}

/// On-chain deposit flag next to the local registration, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatus {
    pub wallet_address: String,
    pub has_deposited: bool,
    pub registration: Option<RegistrationRecord>,
}

/// Composes network reconciliation, transaction execution and the store.
///
/// Holds no wallet: every flow borrows one for its own duration.
#[derive(Clone)]
pub struct DepositDesk {
    chain: ChainDescriptor,
    contract: Arc<dyn DepositContract>,
    executor: TransactionExecutor,
    store: Arc<dyn RegistrationStore>,
}

impl DepositDesk {
    pub fn new(
        chain: ChainDescriptor,
        contract: Arc<dyn DepositContract>,
        store: Arc<dyn RegistrationStore>,
    ) -> Self {
        Self {
            executor: TransactionExecutor::new(contract.clone()),
            chain,
            contract,
            store,
        }
    }

    pub fn chain(&self) -> &ChainDescriptor {
        &self.chain
    }

    pub fn store(&self) -> &Arc<dyn RegistrationStore> {
        &self.store
    }

    /// Pay the deposit from `address` and record the registration.
    ///
    /// A deposit already present on-chain is refused before the wallet is
    /// asked to sign. A local record alone never blocks a deposit.
    pub async fn deposit(
        &self,
        wallet: &dyn WalletCapability,
        address: Address,
        form: RegistrationForm,
    ) -> Result<DepositReceipt, ClassifiedError> {
        tracing::info!(wallet = %address, "Starting deposit");
        ensure_network(wallet, &self.chain).await?;

        if self.contract.has_deposited(address).await? {
            tracing::info!(wallet = %address, "Address has already deposited");
            return Err(ClassifiedError::new(
                ErrorKind::ContractReverted,
                format!("{} has already deposited", address),
            ));
        }

        let signer = wallet.signer_for(address).await?;
        let outcome = self.executor.execute(signer.as_ref(), Operation::Deposit).await?;

        let registration = RegistrationRecord::deposited(&address, form, &outcome.tx_hash);
        if let Err(e) = self.store.upsert(registration.clone()).await {
            tracing::error!(
                wallet = %address,
                tx_hash = %outcome.tx_hash,
                error = %e,
                "Deposit confirmed but registration could not be saved"
            );
            return Err(ClassifiedError::new(
                ErrorKind::StorageIOError,
                format!(
                    "deposit {} confirmed but saving the registration failed: {}",
                    outcome.tx_hash, e
                ),
            ));
        }

        Ok(DepositReceipt {
            explorer_url: self.chain.tx_url(&outcome.tx_hash),
            outcome,
            registration,
        })
    }

    pub async fn contract_info(&self) -> Result<ContractInfo, ClassifiedError> {
        contract_info(self.contract.as_ref(), &self.chain).await
    }

    /// Registration `address` may redeem against, if it has deposited on-chain.
    pub async fn prepare_redemption(
        &self,
        address: Address,
    ) -> Result<Option<RegistrationRecord>, ClassifiedError> {
        prepare_redemption(self.contract.as_ref(), self.store.as_ref(), address).await
    }

    /// Both views of `address`, read concurrently. Unlike
    /// [`prepare_redemption`](Self::prepare_redemption) a store failure is surfaced.
    pub async fn status(&self, address: Address) -> Result<WalletStatus, ClassifiedError> {
        let key = address_key(&address);
        let (on_chain, local) =
            tokio::join!(self.contract.has_deposited(address), self.store.get_by_key(&key));
        Ok(WalletStatus {
            has_deposited: on_chain?,
            registration: local?,
            wallet_address: key,
        })
    }

    /// Redeem the deposit of `address` and drop its local registration.
    ///
    /// Once the redeem transaction is mined the flow reports success, even
    /// if the local cleanup fails.
    pub async fn redeem(
        &self,
        wallet: &dyn WalletCapability,
        address: Address,
    ) -> Result<RedemptionReceipt, ClassifiedError> {
        tracing::info!(wallet = %address, "Starting redemption");
        let registration = self.prepare_redemption(address).await?.ok_or_else(|| {
            ClassifiedError::new(
                ErrorKind::ContractReverted,
                format!("{} has no deposit to redeem", address_key(&address)),
            )
        })?;

        ensure_network(wallet, &self.chain).await?;
        let signer = wallet.signer_for(address).await?;
        let outcome = self.executor.execute(signer.as_ref(), Operation::Redeem).await?;

        complete_redemption(self.store.as_ref(), address).await;

        Ok(RedemptionReceipt {
            explorer_url: self.chain.tx_url(&outcome.tx_hash),
            outcome,
            registration,
        })
    }
}
