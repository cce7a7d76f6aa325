//! Private address block list.
//!
//! Keeps the playground from being pointed at loopback, RFC 1918 and
//! link-local targets. Matching is purely textual on the URL host: names are
//! never resolved, so a public hostname that resolves to a private address
//! is not caught.

use url::{Host, Url};

/// Host prefixes that are always refused.
const PRIVATE_PREFIXES: &[&str] = &["127.", "10.", "192.168.", "fc00:", "fe80:"];

/// Hosts refused only on an exact match.
const PRIVATE_EXACT: &[&str] = &["localhost", "::1"];

/// Returns true if the URL's host falls in the private block list.
///
/// IPv6 literals are compared without their surrounding brackets.
pub fn is_private_url(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => is_private_host(domain),
        Some(Host::Ipv4(addr)) => is_private_host(&addr.to_string()),
        Some(Host::Ipv6(addr)) => is_private_host(&addr.to_string()),
        None => false,
    }
}

/// Case-insensitive pattern match against a bare hostname.
pub fn is_private_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();

    if PRIVATE_EXACT.iter().any(|exact| host == *exact) {
        return true;
    }
    if PRIVATE_PREFIXES.iter().any(|prefix| host.starts_with(prefix)) {
        return true;
    }
    is_private_172(&host)
}

/// `172.16.*` through `172.31.*`.
fn is_private_172(host: &str) -> bool {
    let Some(rest) = host.strip_prefix("172.") else {
        return false;
    };
    let Some((octet, _)) = rest.split_once('.') else {
        return false;
    };
    matches!(octet.parse::<u8>(), Ok(16..=31)) && octet.len() == 2
}
