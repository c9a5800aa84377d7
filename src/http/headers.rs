//! Header filtering shared by request forwarding and response composition.

use hyper::header::HeaderName;

/// Connection-scoped headers that must not cross the relay
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Upstream response headers the relay computes itself instead of copying
pub fn is_recomputed(name: &HeaderName) -> bool {
    let name = name.as_str();
    name == "content-length" || name.starts_with("access-control-") || name == "vary"
}
