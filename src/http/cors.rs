//! CORS response headers.

use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, VARY,
};
use hyper::HeaderMap;

use crate::config::CorsConfig;

/// CORS headers for one accepted request
#[derive(Debug, Clone, Copy)]
pub struct CorsHeaders<'a> {
    pub allow_origin: &'a str,
    pub config: &'a CorsConfig,
}

impl<'a> CorsHeaders<'a> {
    pub const fn new(allow_origin: &'a str, config: &'a CorsConfig) -> Self {
        Self {
            allow_origin,
            config,
        }
    }

    /// Headers for an actual (non-preflight) response
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Ok(v) = HeaderValue::from_str(self.allow_origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, v);
        }
        if !self.config.expose_headers.is_empty() {
            if let Ok(v) = HeaderValue::from_str(&self.config.expose_headers) {
                headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, v);
            }
        }
        if self.allow_origin != "*" {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
    }

    /// Headers for a preflight response
    pub fn apply_preflight(&self, headers: &mut HeaderMap) {
        self.apply(headers);
        if let Ok(v) = HeaderValue::from_str(&self.config.allow_methods) {
            headers.insert(ACCESS_CONTROL_ALLOW_METHODS, v);
        }
        if let Ok(v) = HeaderValue::from_str(&self.config.allow_headers) {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, v);
        }
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(self.config.max_age));
    }
}
