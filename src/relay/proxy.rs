//! Generic reverse-proxy helpers: outbound header rewriting and `Location`
//! rewriting so redirects come back through the relay.

use hyper::header::{HeaderValue, CONTENT_LENGTH, HOST, ORIGIN, REFERER};
use hyper::{HeaderMap, StatusCode};
use url::Url;

use crate::http::headers::is_hop_by_hop;

/// Relay credential; never forwarded upstream
pub const API_KEY_HEADER: &str = "x-api-key";

/// Headers for the upstream request: browser-origin headers stripped, `Host`
/// pointed at the upstream
pub fn upstream_headers(inbound: &HeaderMap, url: &Url) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        // Content-Length is recomputed by the client from the body actually sent
        if *name == ORIGIN
            || *name == REFERER
            || *name == HOST
            || *name == CONTENT_LENGTH
            || name.as_str() == API_KEY_HEADER
            || is_hop_by_hop(name)
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }

    if let Some(host) = url.host_str() {
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        if let Ok(v) = HeaderValue::from_str(&host) {
            out.insert(HOST, v);
        }
    }
    out
}

pub const fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Remainder of `path` below the base path, on a segment boundary.
///
/// `/base/x` and `/base` are under `/base`; `/basement` is not.
pub fn path_under_base<'a>(path: &'a str, base: &Url) -> Option<&'a str> {
    let rest = path.strip_prefix(base.path().trim_end_matches('/'))?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

/// Map an upstream `Location` back onto the proxy prefix.
///
/// `location` is resolved against the upstream request URL. Returns `None`
/// when the target leaves the proxy base (other origin, or outside the base
/// path); such redirects are passed through untouched.
pub fn rewrite_location(
    location: &str,
    request_url: &Url,
    base: &Url,
    prefix: &str,
) -> Option<String> {
    let resolved = request_url.join(location).ok()?;
    if resolved.origin() != base.origin() {
        return None;
    }

    let rest = path_under_base(resolved.path(), base)?;

    let mut out = format!("{prefix}{rest}");
    if let Some(q) = resolved.query() {
        out.push('?');
        out.push_str(q);
    }
    if let Some(f) = resolved.fragment() {
        out.push('#');
        out.push_str(f);
    }
    Some(out)
}
