//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Socket operation (connect / read / write)
//!     → timeouts.rs (enforce per-connection deadline)
//!     → on expiry: handler moves to Closed
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every socket operation has a deadline
//! - No retries: a failed relay closes the client connection

pub mod timeouts;
