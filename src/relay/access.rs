//! Origin and API-key validation.
//!
//! Rules are evaluated in order and the first match wins:
//! 1. no API key configured: development mode, everything is allowed
//! 2. `Origin` is on the allow-list
//! 3. `Origin` is a localhost origin and the `Referer` carries the dev keyword
//! 4. no `Origin` and `X-API-Key` equals the configured key
//!
//! Anything else is denied.

use url::Url;

use crate::config::AccessConfig;

/// Credentials a request presents, taken from its headers
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub origin: Option<&'a str>,
    pub referer: Option<&'a str>,
    pub api_key: Option<&'a str>,
}

/// Outcome of the access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Value for `Access-Control-Allow-Origin`
    Allowed { allow_origin: String },
    Denied,
}

impl AccessDecision {
    pub fn allow_origin(&self) -> Option<&str> {
        match self {
            Self::Allowed { allow_origin } => Some(allow_origin),
            Self::Denied => None,
        }
    }
}

pub fn check_access(req: &AccessRequest<'_>, cfg: &AccessConfig) -> AccessDecision {
    // An empty header is the same as a missing one
    let origin = req.origin.filter(|o| !o.is_empty());

    let Some(secret) = cfg.api_key.as_deref() else {
        return allowed(origin.unwrap_or("*"));
    };

    match origin {
        Some(origin) if cfg.allowed_origins.iter().any(|o| o == origin) => allowed(origin),
        Some(origin) if is_dev_origin(origin, req.referer, cfg) => allowed(origin),
        Some(_) => AccessDecision::Denied,
        None if req.api_key.is_some_and(|key| keys_match(key, secret)) => allowed("*"),
        None => AccessDecision::Denied,
    }
}

/// Compare without short-circuiting on the first differing byte; only the
/// length is observable through timing.
fn keys_match(presented: &str, secret: &str) -> bool {
    let (a, b) = (presented.as_bytes(), secret.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn allowed(origin: &str) -> AccessDecision {
    AccessDecision::Allowed {
        allow_origin: origin.to_string(),
    }
}

fn is_dev_origin(origin: &str, referer: Option<&str>, cfg: &AccessConfig) -> bool {
    let Some(keyword) = cfg.dev_referer_keyword.as_deref().filter(|k| !k.is_empty()) else {
        return false;
    };
    let is_local = Url::parse(origin)
        .ok()
        .and_then(|u| u.host_str().map(|h| h == "localhost" || h == "127.0.0.1"))
        .unwrap_or(false);

    is_local && referer.is_some_and(|r| r.contains(keyword))
}
