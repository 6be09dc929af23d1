//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (SO_REUSEADDR, backlog, accept)
//!     → connection.rs (id, tracking guard, state names)
//!     → Hand off to the proxy handler (one task per connection)
//!
//! Connection States:
//!     AwaitingRequest → Routing → (EasterEgg | Forwarding → AwaitingResponse
//!     → Transforming → Replying) → Closed
//! ```
//!
//! # Design Decisions
//! - Dispatch is immediate and unbounded; the accept loop never waits on a handler
//! - Each connection tracked so shutdown can drain in-flight work
//! - Socket teardown is best-effort and never reports failure

pub mod connection;
pub mod listener;

pub use connection::{close_quietly, ConnectionGuard, ConnectionId, ConnectionState, ConnectionTracker};
pub use listener::{Listener, ListenerError};
