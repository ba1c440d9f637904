//! Redemption eligibility and cleanup.
//!
//! The contract decides who may redeem. The local store only adds the
//! registration details; it can neither grant nor block a redemption.

use alloy::primitives::Address;

use crate::blockchain::classify::ClassifiedError;
use crate::blockchain::contract::DepositContract;
use crate::registrations::store::RegistrationStore;
use crate::registrations::types::{address_key, RegistrationRecord};

/// Registration to redeem against, or `None` if the address has no deposit on-chain.
///
/// The on-chain flag and the local record are read concurrently. A deposit
/// with no local record (made through another client) yields a placeholder.
pub async fn prepare_redemption(
    contract: &dyn DepositContract,
    store: &dyn RegistrationStore,
    address: Address,
) -> Result<Option<RegistrationRecord>, ClassifiedError> {
    let key = address_key(&address);
    let (on_chain, local) = tokio::join!(contract.has_deposited(address), store.get_by_key(&key));

    if !on_chain? {
        if let Ok(Some(_)) = local {
            tracing::info!(wallet = %key, "Local registration without on-chain deposit, ignoring it");
        }
        return Ok(None);
    }

    let record = match local {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::info!(wallet = %key, "Deposit found on-chain without local registration");
            RegistrationRecord::placeholder(&address)
        }
        Err(e) => {
            tracing::warn!(wallet = %key, error = %e, "Registration lookup failed, using placeholder");
            RegistrationRecord::placeholder(&address)
        }
    };
    Ok(Some(record))
}

/// Drop the now-redundant local record after a confirmed redeem.
///
/// Failures are logged and swallowed: the redemption already happened on-chain.
pub async fn complete_redemption(store: &dyn RegistrationStore, address: Address) {
    let key = address_key(&address);
    match store.delete_by_key(&key).await {
        Ok(()) => tracing::debug!(wallet = %key, "Registration cleaned up after redemption"),
        Err(e) => tracing::warn!(
            wallet = %key,
            error = %e,
            "Could not delete registration after redemption"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::classify::ErrorKind;
    use crate::blockchain::mock::{MockContract, TEST_ACCOUNT};
    use crate::blockchain::types::RawFailure;
    use crate::registrations::mock::MemoryStore;
    use alloy::primitives::U256;

    fn stored(address: &Address, name: &str) -> RegistrationRecord {
        RegistrationRecord {
            name: name.to_string(),
            ..RegistrationRecord::placeholder(address)
        }
    }

    #[tokio::test]
    async fn test_no_onchain_deposit_wins_over_local_record() {
        let contract = MockContract::new(U256::from(1u64));
        let store = MemoryStore::with_records(vec![stored(&TEST_ACCOUNT, "stale")]);

        let prepared = prepare_redemption(&contract, &store, TEST_ACCOUNT).await.unwrap();
        assert!(prepared.is_none());
    }

    #[tokio::test]
    async fn test_local_record_is_returned() {
        let contract = MockContract::new(U256::from(1u64)).with_depositor(TEST_ACCOUNT);
        let store = MemoryStore::with_records(vec![stored(&TEST_ACCOUNT, "Ada")]);

        let prepared = prepare_redemption(&contract, &store, TEST_ACCOUNT).await.unwrap().unwrap();
        assert_eq!(prepared.name, "Ada");
    }

    #[tokio::test]
    async fn test_missing_local_record_yields_placeholder() {
        let contract = MockContract::new(U256::from(1u64)).with_depositor(TEST_ACCOUNT);
        let store = MemoryStore::default();

        let prepared = prepare_redemption(&contract, &store, TEST_ACCOUNT).await.unwrap().unwrap();
        assert!(prepared.deposit_paid);
        assert!(prepared.name.is_empty());
        assert_eq!(prepared.wallet_address, address_key(&TEST_ACCOUNT));
    }

    #[tokio::test]
    async fn test_store_failure_does_not_block_redemption() {
        let contract = MockContract::new(U256::from(1u64)).with_depositor(TEST_ACCOUNT);
        let store = MemoryStore::default().failing_reads();

        let prepared = prepare_redemption(&contract, &store, TEST_ACCOUNT).await.unwrap();
        assert!(prepared.unwrap().deposit_paid);
    }

    #[tokio::test]
    async fn test_onchain_failure_is_surfaced() {
        let contract = MockContract::new(U256::from(1u64)).failing(RawFailure::Transport("down".into()));
        let store = MemoryStore::default();

        let err = prepare_redemption(&contract, &store, TEST_ACCOUNT).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TransportError);
    }

    #[tokio::test]
    async fn test_cleanup_failure_is_swallowed() {
        let store = MemoryStore::with_records(vec![stored(&TEST_ACCOUNT, "Ada")]).failing_deletes();
        complete_redemption(&store, TEST_ACCOUNT).await;
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_deletes_record() {
        let store = MemoryStore::with_records(vec![stored(&TEST_ACCOUNT, "Ada")]);
        complete_redemption(&store, TEST_ACCOUNT).await;
        assert!(store.records().is_empty());
    }
}
