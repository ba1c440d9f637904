//! In-memory wallet, signer and contract doubles for tests.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::blockchain::contract::DepositContract;
use crate::blockchain::types::{
    ChainDescriptor, ContractCall, MinedReceipt, RawFailure, UNRECOGNIZED_CHAIN_CODE,
};
use crate::blockchain::wallet::{TxSigner, WalletCapability};

pub(crate) const TEST_ACCOUNT: Address = Address::repeat_byte(0xa1);

/// Requests a [`MockWallet`] has received.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WalletCalls {
    pub chain_queries: usize,
    pub switch_requests: usize,
    pub add_requests: usize,
    pub signer_requests: usize,
}

pub(crate) struct MockWallet {
    chain: AtomicU64,
    known: Mutex<HashSet<u64>>,
    switch_on_add: bool,
    ignore_switches: bool,
    switch_failure: Option<RawFailure>,
    signer: Arc<MockSigner>,
    calls: Mutex<WalletCalls>,
}

impl MockWallet {
    pub fn on_chain(chain_id: u64) -> Self {
        Self {
            chain: AtomicU64::new(chain_id),
            known: Mutex::new(HashSet::from([chain_id])),
            switch_on_add: false,
            ignore_switches: false,
            switch_failure: None,
            signer: Arc::new(MockSigner::new(TEST_ACCOUNT)),
            calls: Mutex::new(WalletCalls::default()),
        }
    }

    pub fn knowing(self, chain_ids: &[u64]) -> Self {
        self.known.lock().unwrap().extend(chain_ids.iter().copied());
        self
    }

    /// Adding a network also makes it active (MetaMask behaviour).
    pub fn switching_on_add(mut self) -> Self {
        self.switch_on_add = true;
        self
    }

    /// Switch requests succeed but the network never changes.
    pub fn ignoring_switches(mut self) -> Self {
        self.ignore_switches = true;
        self
    }

    pub fn failing_switch(mut self, failure: RawFailure) -> Self {
        self.switch_failure = Some(failure);
        self
    }

    pub fn with_signer(mut self, signer: MockSigner) -> Self {
        self.signer = Arc::new(signer);
        self
    }

    pub fn calls(&self) -> WalletCalls {
        *self.calls.lock().unwrap()
    }

    pub fn signer(&self) -> Arc<MockSigner> {
        self.signer.clone()
    }
}

#[async_trait]
impl WalletCapability for MockWallet {
    async fn current_chain_id(&self) -> Result<u64, RawFailure> {
        self.calls.lock().unwrap().chain_queries += 1;
        Ok(self.chain.load(Ordering::SeqCst))
    }

    async fn request_switch_chain(&self, chain_id: u64) -> Result<(), RawFailure> {
        self.calls.lock().unwrap().switch_requests += 1;
        if let Some(failure) = &self.switch_failure {
            return Err(failure.clone());
        }
        if !self.known.lock().unwrap().contains(&chain_id) {
            return Err(RawFailure::provider(UNRECOGNIZED_CHAIN_CODE, "Unrecognized chain ID"));
        }
        if !self.ignore_switches {
            self.chain.store(chain_id, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn request_add_chain(&self, chain: &ChainDescriptor) -> Result<(), RawFailure> {
        self.calls.lock().unwrap().add_requests += 1;
        self.known.lock().unwrap().insert(chain.chain_id);
        if self.switch_on_add && !self.ignore_switches {
            self.chain.store(chain.chain_id, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn signer_for(&self, address: Address) -> Result<Arc<dyn TxSigner>, RawFailure> {
        self.calls.lock().unwrap().signer_requests += 1;
        if address != self.signer.address {
            return Err(RawFailure::Other(format!("no signer for {}", address)));
        }
        Ok(self.signer.clone() as Arc<dyn TxSigner>)
    }
}

pub(crate) struct MockSigner {
    address: Address,
    send_failure: Option<RawFailure>,
    revert: bool,
    block: u64,
    sent: Mutex<Vec<ContractCall>>,
    nonce: AtomicU64,
}

impl MockSigner {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            send_failure: None,
            revert: false,
            block: 100,
            sent: Mutex::new(Vec::new()),
            nonce: AtomicU64::new(1),
        }
    }

    /// Every submission fails with `failure` (e.g. the user declining).
    pub fn failing(mut self, failure: RawFailure) -> Self {
        self.send_failure = Some(failure);
        self
    }

    /// Submissions are mined with a failed status.
    pub fn reverting(mut self) -> Self {
        self.revert = true;
        self
    }

    pub fn sent(&self) -> Vec<ContractCall> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TxSigner for MockSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_call(&self, call: ContractCall) -> Result<TxHash, RawFailure> {
        if let Some(failure) = &self.send_failure {
            return Err(failure.clone());
        }
        self.sent.lock().unwrap().push(call);
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        Ok(TxHash::with_last_byte(nonce as u8))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<MinedReceipt, RawFailure> {
        Ok(MinedReceipt {
            tx_hash,
            block_number: Some(self.block),
            success: !self.revert,
        })
    }
}

pub(crate) struct MockContract {
    address: Address,
    amount: U256,
    admin: Address,
    deadline: u64,
    depositors: Mutex<HashSet<Address>>,
    failure: Option<RawFailure>,
}

impl MockContract {
    pub fn new(amount: U256) -> Self {
        Self {
            address: Address::repeat_byte(0xc0),
            amount,
            admin: Address::repeat_byte(0xad),
            deadline: 1_760_000_000,
            depositors: Mutex::new(HashSet::new()),
            failure: None,
        }
    }

    pub fn with_depositor(self, user: Address) -> Self {
        self.depositors.lock().unwrap().insert(user);
        self
    }

    /// Every view fails with `failure`.
    pub fn failing(mut self, failure: RawFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn admin_address(&self) -> Address {
        self.admin
    }

    pub fn deadline(&self) -> u64 {
        self.deadline
    }

    fn check(&self) -> Result<(), RawFailure> {
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DepositContract for MockContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn deposit_amount(&self) -> Result<U256, RawFailure> {
        self.check()?;
        Ok(self.amount)
    }

    async fn has_deposited(&self, user: Address) -> Result<bool, RawFailure> {
        self.check()?;
        Ok(self.depositors.lock().unwrap().contains(&user))
    }

    async fn admin(&self) -> Result<Address, RawFailure> {
        self.check()?;
        Ok(self.admin)
    }

    async fn redemption_deadline(&self) -> Result<u64, RawFailure> {
        self.check()?;
        Ok(self.deadline)
    }
}
