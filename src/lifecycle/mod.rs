//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → listener stops accepting, health monitor exits
//!     → server awaits the monitor task → process exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
