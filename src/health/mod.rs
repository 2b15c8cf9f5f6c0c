//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (active.rs)
//!     → probe every backend's liveness path concurrently
//!     → Registry::set_healthy per backend
//!     → log up/down transitions
//! ```
//!
//! # Design Decisions
//! - Liveness is defined by probes only; failed forwards never change it
//! - Each probe is time-boxed so one dead backend cannot stall a cycle
//! - The monitor task stops on the shutdown broadcast

pub mod active;

pub use active::HealthMonitor;
