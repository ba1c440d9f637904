//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! wallet (borrowed per call)
//!     → network.rs (verify / switch / add the target chain)
//!     → wallet.rs (signer for the user's address)
//!     → transaction.rs (build, submit, wait until mined)
//!     → classify.rs (on failure: one ErrorKind per remedy)
//!
//! client.rs (read-only RPC with failover)
//!     → contract.rs views: depositAmount, hasDeposited, admin, deadline
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - Never sign on a chain other than the configured one
//! - No automatic resubmission of value-bearing transactions

pub mod classify;
pub mod client;
pub mod contract;
pub mod network;
pub mod transaction;
pub mod types;
pub mod wallet;

#[cfg(test)]
pub(crate) mod mock;

pub use classify::{classify, ClassifiedError, ErrorKind};
pub use client::ChainClient;
pub use contract::{contract_info, ContractInfo, DepositContract};
pub use network::{ensure_network, NetworkError};
pub use transaction::TransactionExecutor;
pub use types::{ChainDescriptor, ChainId, Operation, RawFailure, TransactionOutcome};
pub use wallet::{LocalWallet, TxSigner, WalletCapability};
