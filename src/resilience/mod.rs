//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call:
//!     → timeouts.rs (race the call against the deadline)
//!     → first to finish decides the outcome
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every outbound call has a deadline
//! - No retries: every failure is terminal for its request

pub mod timeouts;

pub use timeouts::{with_deadline, DeadlineElapsed, DEFAULT_REQUEST_TIMEOUT};
