//! Timeout enforcement.
//!
//! # Responsibilities
//! - Race an outbound call against a timer
//! - Cancel the loser cleanly on every path
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Dropping the call future releases its connection; dropping the timer
//!   deregisters it
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Default deadline for a proxied call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The deadline fired before the call completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} elapsed")]
pub struct DeadlineElapsed(pub Duration);

/// Run `call` until it completes or `deadline` passes, whichever is first.
///
/// On expiry the in-flight future is dropped, which cancels it.
pub async fn with_deadline<F>(deadline: Duration, call: F) -> Result<F::Output, DeadlineElapsed>
where
    F: Future,
{
    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| DeadlineElapsed(deadline))
}
