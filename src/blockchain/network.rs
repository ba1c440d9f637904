//! Network reconciliation.
//!
//! Before anything is signed the wallet must be on the deployment's chain:
//! a signature made on the wrong chain pays fees in the wrong currency or
//! lands on the wrong contract.

use thiserror::Error;

use crate::blockchain::classify::{classify, ClassifiedError, ErrorKind};
use crate::blockchain::types::{ChainDescriptor, RawFailure};
use crate::blockchain::wallet::WalletCapability;

/// Errors that can occur while moving a wallet to the target network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The wallet is still on another chain after switching.
    #[error("Chain ID mismatch: expected {expected}, wallet is on {actual}")]
    Mismatch { expected: u64, actual: u64 },

    /// The wallet refused or failed a request.
    #[error(transparent)]
    Wallet(#[from] RawFailure),
}

impl From<NetworkError> for ClassifiedError {
    fn from(err: NetworkError) -> Self {
        match &err {
            NetworkError::Mismatch { .. } => {
                ClassifiedError::new(ErrorKind::NetworkMismatch, err.to_string())
            }
            NetworkError::Wallet(raw) => classify(raw),
        }
    }
}

/// Make sure `wallet` is connected to `chain`, switching or registering it if not.
///
/// A wallet already on `chain` gets no requests beyond the chain id query.
/// When the wallet does not know the chain it is added first, then switched
/// to if adding alone did not move it. The chain id is always re-read after
/// a switch/add and a remaining difference fails with [`NetworkError::Mismatch`].
pub async fn ensure_network(
    wallet: &dyn WalletCapability,
    chain: &ChainDescriptor,
) -> Result<(), NetworkError> {
    let current = wallet.current_chain_id().await?;
    if current == chain.chain_id {
        tracing::debug!(chain_id = current, "Wallet already on target network");
        return Ok(());
    }

    tracing::info!(
        current_chain_id = current,
        expected_chain_id = chain.chain_id,
        "Wrong network detected, attempting to switch"
    );

    match wallet.request_switch_chain(chain.chain_id).await {
        Ok(()) => {}
        Err(e) if e.is_unrecognized_chain() => {
            tracing::info!(chain_id = chain.chain_id, chain_name = %chain.chain_name, "Network unknown to wallet, adding it");
            wallet.request_add_chain(chain).await?;

            // Some wallets switch as part of adding, some don't
            if wallet.current_chain_id().await? != chain.chain_id {
                wallet.request_switch_chain(chain.chain_id).await?;
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Wallet refused network switch");
            return Err(e.into());
        }
    }

    let actual = wallet.current_chain_id().await?;
    if actual != chain.chain_id {
        tracing::warn!(expected = chain.chain_id, actual, "Wallet still on wrong network");
        return Err(NetworkError::Mismatch {
            expected: chain.chain_id,
            actual,
        });
    }

    tracing::info!(chain_id = actual, "Wallet switched to target network");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::MockWallet;
    use crate::blockchain::types::USER_REJECTED_CODE;

    fn target() -> ChainDescriptor {
        ChainDescriptor::default()
    }

    #[tokio::test]
    async fn test_already_on_target_is_noop() {
        let wallet = MockWallet::on_chain(target().chain_id).knowing(&[target().chain_id]);
        ensure_network(&wallet, &target()).await.unwrap();

        let calls = wallet.calls();
        assert_eq!(calls.chain_queries, 1);
        assert_eq!(calls.switch_requests, 0);
        assert_eq!(calls.add_requests, 0);
    }

    #[tokio::test]
    async fn test_known_chain_is_switched() {
        let wallet = MockWallet::on_chain(1).knowing(&[1, target().chain_id]);
        ensure_network(&wallet, &target()).await.unwrap();

        let calls = wallet.calls();
        assert_eq!(calls.switch_requests, 1);
        assert_eq!(calls.add_requests, 0);
        // Initial read plus the confirming one
        assert_eq!(calls.chain_queries, 2);
        assert_eq!(wallet.current_chain_id().await.unwrap(), target().chain_id);
    }

    #[tokio::test]
    async fn test_unknown_chain_is_added_then_switched() {
        let wallet = MockWallet::on_chain(1).knowing(&[1]);
        ensure_network(&wallet, &target()).await.unwrap();

        let calls = wallet.calls();
        assert_eq!(calls.add_requests, 1);
        // Initial attempt plus the one after registering
        assert_eq!(calls.switch_requests, 2);
        assert_eq!(calls.chain_queries, 3);
        assert_eq!(wallet.current_chain_id().await.unwrap(), target().chain_id);
    }

    #[tokio::test]
    async fn test_add_that_switches_needs_no_second_switch() {
        let wallet = MockWallet::on_chain(1).knowing(&[1]).switching_on_add();
        ensure_network(&wallet, &target()).await.unwrap();

        let calls = wallet.calls();
        assert_eq!(calls.add_requests, 1);
        assert_eq!(calls.switch_requests, 1);
        assert_eq!(calls.chain_queries, 3);
    }

    #[tokio::test]
    async fn test_switch_that_does_not_stick_is_mismatch() {
        let wallet = MockWallet::on_chain(1).knowing(&[1]).ignoring_switches();
        let err = ensure_network(&wallet, &target()).await.unwrap_err();

        assert_eq!(
            err,
            NetworkError::Mismatch {
                expected: target().chain_id,
                actual: 1
            }
        );
        let calls = wallet.calls();
        assert_eq!(calls.add_requests, 1);
        // The chain id is re-read after the final switch, not assumed
        assert_eq!(calls.chain_queries, 3);
        assert_eq!(ClassifiedError::from(err).kind, ErrorKind::NetworkMismatch);
    }

    #[tokio::test]
    async fn test_rejected_switch_is_surfaced() {
        let wallet = MockWallet::on_chain(1)
            .knowing(&[1, target().chain_id])
            .failing_switch(RawFailure::provider(USER_REJECTED_CODE, "User rejected the request."));
        let err = ensure_network(&wallet, &target()).await.unwrap_err();

        assert_eq!(ClassifiedError::from(err).kind, ErrorKind::UserRejected);
        let calls = wallet.calls();
        assert_eq!(calls.add_requests, 0);
        assert_eq!(calls.chain_queries, 1);
    }
}
