//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all dispatch route)
//!     → request.rs (request id assigned and echoed back)
//!     → registry picks a backend, pool lends a client
//!     → buffered backend response relayed to the caller
//! ```

pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
