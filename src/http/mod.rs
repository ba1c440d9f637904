//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, body limit, metrics)
//!     → handlers.rs (registrations via the store, chain reads via the contract)
//!     → error.rs (StoreError / ClassifiedError → JSON error body)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
