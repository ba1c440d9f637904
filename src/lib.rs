//! Deposit desk: event deposit / redeem orchestration with a registration store.

// Core subsystems
pub mod blockchain;
pub mod registrations;

// Service surface
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use blockchain::{ClassifiedError, ErrorKind};
pub use config::AppConfig;
pub use http::HttpServer;
pub use registrations::{DepositDesk, FileStore, RegistrationStore};
