//! Response and request size limits.
//!
//! The response cap is checked after the upstream body has been fully
//! buffered; bytes past the cap are still downloaded before rejection.

/// Default cap on upstream response bodies (1 MiB).
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Default cap on the inbound JSON request body (1 MiB).
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

const MIB: usize = 1024 * 1024;
const KIB: usize = 1024;

/// Returns true if a body of `len` bytes is over the cap.
///
/// A body of exactly `max` bytes is accepted.
pub fn exceeds_limit(len: usize, max: usize) -> bool {
    len > max
}

/// Human form of a byte limit as shown in error messages ("1MB", "512KB").
pub fn format_limit(bytes: usize) -> String {
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}
