//! Deposit contract binding.
//!
//! # Responsibilities
//! - ABI of the deposit contract (`sol!`)
//! - Read-only views behind the `DepositContract` trait
//! - Encoding of the two state-changing calls

use alloy::primitives::{Address, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use serde::Serialize;

use crate::blockchain::classify::ClassifiedError;
use crate::blockchain::types::{ChainDescriptor, ContractCall, RawFailure};

sol! {
    /// Fixed-amount event deposit with a redemption deadline.
    interface IEventDeposit {
        function deposit() external payable;
        function redeem() external;
        function hasDeposited(address _user) external view returns (bool);
        function admin() external view returns (address);
        function DEPOSIT_AMOUNT() external view returns (uint256);
        function REDEMPTION_DEADLINE() external view returns (uint256);
    }
}

/// Read-only views of the deposit contract.
#[async_trait]
pub trait DepositContract: Send + Sync {
    /// Address the contract is deployed at.
    fn address(&self) -> Address;

    /// Exact value (in base units) `deposit` must carry.
    async fn deposit_amount(&self) -> Result<U256, RawFailure>;

    async fn has_deposited(&self, user: Address) -> Result<bool, RawFailure>;

    async fn admin(&self) -> Result<Address, RawFailure>;

    /// Redemption deadline as unix seconds.
    async fn redemption_deadline(&self) -> Result<u64, RawFailure>;
}

/// Payable `deposit()` carrying `value`.
pub fn deposit_call(contract: Address, value: U256) -> ContractCall {
    ContractCall {
        to: contract,
        value,
        input: IEventDeposit::depositCall {}.abi_encode().into(),
    }
}

/// No-argument `redeem()`.
pub fn redeem_call(contract: Address) -> ContractCall {
    ContractCall {
        to: contract,
        value: U256::ZERO,
        input: IEventDeposit::redeemCall {}.abi_encode().into(),
    }
}

/// Snapshot of the contract's governing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub address: Address,
    pub admin: Address,
    pub deposit_amount: U256,
    /// Deposit amount in whole native units, e.g. `1.0 PAS`.
    pub deposit_amount_display: String,
    pub redemption_deadline: u64,
}

impl ContractInfo {
    pub fn is_before_deadline(&self, now_secs: u64) -> bool {
        now_secs < self.redemption_deadline
    }
}

/// Read admin, deposit amount and deadline concurrently.
pub async fn contract_info(
    contract: &dyn DepositContract,
    chain: &ChainDescriptor,
) -> Result<ContractInfo, ClassifiedError> {
    let (admin, deposit_amount, redemption_deadline) = tokio::try_join!(
        contract.admin(),
        contract.deposit_amount(),
        contract.redemption_deadline(),
    )?;

    Ok(ContractInfo {
        address: contract.address(),
        admin,
        deposit_amount,
        deposit_amount_display: chain.format_amount(deposit_amount),
        redemption_deadline,
    })
}
