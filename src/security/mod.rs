//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Proxied request:
//!     → access_control.rs (refuse private/local targets)
//!     → headers.rs (filter user headers, default User-Agent)
//!     → [outbound call]
//!     → limits.rs (response size cap)
//!     → headers.rs (collapse response headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - Host checks are textual; no DNS resolution happens before the call

pub mod access_control;
pub mod headers;
pub mod limits;

pub use access_control::{is_private_host, is_private_url};
pub use headers::{build_outbound_headers, collect_response_headers, HeaderError};
pub use limits::{exceeds_limit, format_limit, DEFAULT_MAX_REQUEST_BYTES, DEFAULT_MAX_RESPONSE_BYTES};
