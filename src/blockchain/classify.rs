//! Failure classification.
//!
//! Every raw wallet/provider/storage failure is folded into one of a small
//! closed set of kinds. Each kind maps to one remedy the user can act on
//! (retry, fund the wallet, switch network, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::blockchain::types::{
    RawFailure, CHAIN_DISCONNECTED_CODE, DISCONNECTED_CODE, EXECUTION_REVERTED_CODE,
    RPC_REVERT_CODE, UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE,
};

/// Closed failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NetworkMismatch,
    UserRejected,
    InsufficientFunds,
    ContractReverted,
    TransportError,
    StorageIOError,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NetworkMismatch => "network_mismatch",
            ErrorKind::UserRejected => "user_rejected",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::ContractReverted => "contract_reverted",
            ErrorKind::TransportError => "transport_error",
            ErrorKind::StorageIOError => "storage_io_error",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// The one message shown to a user for this kind.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::NetworkMismatch => {
                "Your wallet is on the wrong network. Switch to the event network and try again."
            }
            ErrorKind::UserRejected => "Transaction rejected in the wallet.",
            ErrorKind::InsufficientFunds => {
                "Insufficient balance to cover the deposit and fees. Fund your wallet and try again."
            }
            ErrorKind::ContractReverted => {
                "The contract refused the transaction (already deposited, nothing to redeem, or past the deadline)."
            }
            ErrorKind::TransportError => "Could not reach the network. Please try again.",
            ErrorKind::StorageIOError => "Could not save your registration. Please try again.",
            ErrorKind::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure mapped to its kind, with the original message kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ClassifiedError {}

impl From<RawFailure> for ClassifiedError {
    fn from(raw: RawFailure) -> Self {
        classify(&raw)
    }
}

/// Map a raw failure to its kind. Never fails; unmatched shapes land in `Unknown`.
pub fn classify(raw: &RawFailure) -> ClassifiedError {
    let kind = match raw {
        RawFailure::Provider { code, message, .. } => classify_code(*code, message),
        RawFailure::Symbolic { code, .. } => classify_symbol(code),
        RawFailure::Transport(_) => ErrorKind::TransportError,
        RawFailure::Reverted { .. } => ErrorKind::ContractReverted,
        RawFailure::Other(_) => ErrorKind::Unknown,
    };
    ClassifiedError::new(kind, raw.to_string())
}

fn classify_code(code: i64, message: &str) -> ErrorKind {
    match code {
        USER_REJECTED_CODE => ErrorKind::UserRejected,
        UNRECOGNIZED_CHAIN_CODE => ErrorKind::NetworkMismatch,
        DISCONNECTED_CODE | CHAIN_DISCONNECTED_CODE => ErrorKind::TransportError,
        EXECUTION_REVERTED_CODE | RPC_REVERT_CODE => ErrorKind::ContractReverted,
        // Generic server errors only say what happened in the message
        _ => classify_message(message),
    }
}

fn classify_message(message: &str) -> ErrorKind {
    let message = message.to_ascii_lowercase();
    if message.contains("insufficient funds") || message.contains("insufficient balance") {
        ErrorKind::InsufficientFunds
    } else if message.contains("execution reverted") || message.contains("revert") {
        ErrorKind::ContractReverted
    } else if message.contains("user rejected") || message.contains("user denied") {
        ErrorKind::UserRejected
    } else {
        ErrorKind::Unknown
    }
}

fn classify_symbol(code: &str) -> ErrorKind {
    match code {
        "ACTION_REJECTED" => ErrorKind::UserRejected,
        "INSUFFICIENT_FUNDS" => ErrorKind::InsufficientFunds,
        "CALL_EXCEPTION" => ErrorKind::ContractReverted,
        "NETWORK_ERROR" | "TIMEOUT" | "SERVER_ERROR" => ErrorKind::TransportError,
        _ => ErrorKind::Unknown,
    }
}
