//! HTTP response building module
//!
//! Builders for the responses the relay produces itself, plus composition of
//! relayed upstream responses.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use hyper::{Response, StatusCode};

use super::cors::CorsHeaders;
use super::headers::{is_hop_by_hop, is_recomputed};
use crate::relay::UpstreamResponse;

/// Build plain-text response, with CORS headers once the origin was accepted
pub fn build_text_response(
    status: StatusCode,
    message: &str,
    cors: Option<&CorsHeaders<'_>>,
) -> Response<Full<Bytes>> {
    let mut resp = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(message.to_string())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from(message.to_string())))
        });
    if let Some(cors) = cors {
        cors.apply(resp.headers_mut());
    }
    resp
}

/// Build 204 preflight response
pub fn build_preflight_response(cors: &CorsHeaders<'_>) -> Response<Full<Bytes>> {
    let mut resp = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        });
    cors.apply_preflight(resp.headers_mut());
    resp
}

/// Build health check response (JSON)
pub fn build_health_response(status: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "status": status }).to_string();
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .header("Cache-Control", "no-cache, no-store, must-revalidate")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Relay an upstream response: status, headers and body are copied, the
/// relay's own CORS headers replace any the upstream sent.
pub fn build_relayed_response(
    upstream: UpstreamResponse,
    cors: &CorsHeaders<'_>,
    location: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body_len = u64::try_from(upstream.body.len()).unwrap_or(u64::MAX);
    // A HEAD answered by a HEAD upstream has no body to measure
    let content_length = if is_head {
        upstream
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(body_len)
    } else {
        body_len
    };
    let body = if is_head { Bytes::new() } else { upstream.body };

    let mut resp = Response::new(Full::new(body));
    *resp.status_mut() = upstream.status;

    let headers = resp.headers_mut();
    for (name, value) in &upstream.headers {
        if !is_hop_by_hop(name) && !is_recomputed(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));

    if let Some(location) = location {
        match HeaderValue::from_str(location) {
            Ok(v) => {
                headers.insert(LOCATION, v);
            }
            Err(e) => crate::logger::log_warning(&format!(
                "Dropping unrepresentable Location '{location}': {e}"
            )),
        }
    }

    cors.apply(headers);
    resp
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
