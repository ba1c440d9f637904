//! Transaction submission and confirmation.
//!
//! # Responsibilities
//! - Build the `deposit` / `redeem` call (deposit value read from the contract)
//! - Submit through the caller's signer
//! - Wait until the transaction is mined
//! - Classify every failure
//!
//! Nothing is retried here: resubmitting a value-bearing call without an
//! idempotency key can pay twice.

use alloy::primitives::Address;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::blockchain::classify::{classify, ClassifiedError};
use crate::blockchain::contract::{deposit_call, redeem_call, DepositContract};
use crate::blockchain::types::{ContractCall, Operation, RawFailure, TransactionOutcome};
use crate::blockchain::wallet::TxSigner;
use crate::observability::metrics;

/// Executes deposit/redeem calls against one contract.
#[derive(Clone)]
pub struct TransactionExecutor {
    contract: Arc<dyn DepositContract>,
}

impl TransactionExecutor {
    pub fn new(contract: Arc<dyn DepositContract>) -> Self {
        Self { contract }
    }

    pub fn contract_address(&self) -> Address {
        self.contract.address()
    }

    /// Submit `operation` with `signer` and wait for it to be mined.
    pub async fn execute(
        &self,
        signer: &dyn TxSigner,
        operation: Operation,
    ) -> Result<TransactionOutcome, ClassifiedError> {
        let result = self.submit_and_confirm(signer, operation).await;
        match &result {
            Ok(outcome) => {
                metrics::record_transaction(operation, "success");
                tracing::info!(
                    operation = %operation,
                    from = %signer.address(),
                    tx_hash = %outcome.tx_hash,
                    block = ?outcome.confirmed_block,
                    "Transaction confirmed"
                );
            }
            Err(err) => {
                metrics::record_transaction(operation, err.kind.as_str());
                tracing::warn!(
                    operation = %operation,
                    from = %signer.address(),
                    kind = %err.kind,
                    error = %err.message,
                    "Transaction failed"
                );
            }
        }
        result
    }

    async fn submit_and_confirm(
        &self,
        signer: &dyn TxSigner,
        operation: Operation,
    ) -> Result<TransactionOutcome, ClassifiedError> {
        let call = self.build_call(operation).await?;

        tracing::info!(operation = %operation, value = %call.value, "Sending transaction");
        let tx_hash = signer.send_call(call).await.map_err(|e| classify(&e))?;
        tracing::info!(operation = %operation, tx_hash = %tx_hash, "Transaction sent, waiting for confirmation");

        let started = Instant::now();
        let receipt = signer
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| classify(&e))?;
        metrics::record_confirmation_time(operation, started.elapsed());

        if !receipt.success {
            return Err(classify(&RawFailure::Reverted {
                tx_hash,
                block_number: receipt.block_number,
            }));
        }

        Ok(TransactionOutcome {
            success: true,
            tx_hash,
            confirmed_block: receipt.block_number,
        })
    }

    async fn build_call(&self, operation: Operation) -> Result<ContractCall, ClassifiedError> {
        let contract = self.contract.address();
        match operation {
            Operation::Deposit => {
                // Contract-governed, never assumed
                let amount = self.contract.deposit_amount().await?;
                tracing::debug!(amount = %amount, "Fetched required deposit amount");
                Ok(deposit_call(contract, amount))
            }
            Operation::Redeem => {
                self.log_deadline().await;
                Ok(redeem_call(contract))
            }
        }
    }

    /// Informational only; the contract itself enforces the deadline.
    async fn log_deadline(&self) {
        match self.contract.redemption_deadline().await {
            Ok(deadline) => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                tracing::info!(
                    deadline,
                    now,
                    before_deadline = now < deadline,
                    "Redeeming deposit"
                );
            }
            Err(e) => tracing::debug!(error = %e, "Could not read redemption deadline"),
        }
    }
}
