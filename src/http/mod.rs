//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! client socket
//!     → framing.rs (read request: short-read heuristic)
//!     → request.rs (method, target, Host)
//!     → easter_egg.rs (synthesized page) | upstream relay
//!     → framing.rs (read response: Content-Length or close)
//!     → message.rs / headers.rs (split, rewrite, reassemble)
//!     → client socket
//! ```
//!
//! Only `Host`, `Content-Type` and `Content-Length` carry meaning here;
//! every other header passes through verbatim.

pub mod easter_egg;
pub mod framing;
pub mod headers;
pub mod message;
pub mod request;

pub use easter_egg::EasterEgg;
pub use framing::MessageReader;
pub use headers::HeaderBlock;
pub use message::RawMessage;
pub use request::{Authority, RequestHead};
