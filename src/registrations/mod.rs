//! Registration subsystem.
//!
//! # Data Flow
//! ```text
//! RegistrationForm + confirmed deposit
//!     → types.rs (RegistrationRecord keyed by lowercase address)
//!     → store.rs (FileStore: whole-file JSON, temp file + rename)
//!       or remote.rs (HttpStore: same operations over /registrations)
//!
//! redemption.rs: hasDeposited ∥ get_by_key → record or placeholder
//! flow.rs: DepositDesk composes the above with the blockchain subsystem
//! ```
//!
//! The contract is the source of truth for who has paid. A record here
//! never grants or blocks a transaction.

pub mod flow;
pub mod redemption;
pub mod remote;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use flow::{DepositDesk, DepositReceipt, RedemptionReceipt, WalletStatus};
pub use redemption::{complete_redemption, prepare_redemption};
pub use remote::HttpStore;
pub use store::{FileStore, RegistrationStore, StoreError};
pub use types::{
    address_key, normalize_address, RegistrationForm, RegistrationRecord, SurveyAnswers,
    TechnologiesUsed,
};
