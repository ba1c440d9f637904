//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! SIGTERM / SIGINT (signals.rs)
//!     → axum graceful shutdown: stop accepting, finish in-flight requests
//!     → Exit
//! ```

pub mod signals;

pub use signals::shutdown_signal;
