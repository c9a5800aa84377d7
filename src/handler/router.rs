//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Every request runs the same
//! linear pipeline: validate access, answer preflights, resolve the upstream,
//! fetch (with at most one fallback) and compose the response.

use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, ALLOW, CONTENT_LENGTH, LOCATION, ORIGIN, REFERER, USER_AGENT};
use hyper::{HeaderMap, Method, Request, Response, Version};

use crate::config::AppState;
use crate::http::{self, CorsHeaders};
use crate::logger::{self, AccessLogEntry};
use crate::relay::proxy::{self, API_KEY_HEADER};
use crate::relay::{
    check_access, fetch_first_success, resolve, AccessRequest, RelayError, UpstreamRequest,
    UpstreamTarget,
};

/// Response plus the upstream that produced it, for the access log
struct Outcome {
    response: Response<Full<Bytes>>,
    upstream: Option<String>,
}

impl From<Response<Full<Bytes>>> for Outcome {
    fn from(response: Response<Full<Bytes>>) -> Self {
        Self {
            response,
            upstream: None,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let started = Instant::now();
    let entry = state
        .access_log()
        .then(|| start_access_entry(&req, peer_addr));

    let outcome = dispatch(req, &state).await;

    if let Some(mut entry) = entry {
        entry.status = outcome.response.status().as_u16();
        entry.body_bytes = outcome.response.body().size_hint().exact().unwrap_or(0);
        entry.upstream = outcome.upstream;
        entry.elapsed = started.elapsed();
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(outcome.response)
}

async fn dispatch<B>(req: Request<B>, state: &AppState) -> Outcome
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let cfg = &state.config;
    let path = req.uri().path();

    // 0. Health check (no access control, always fast)
    if cfg.health.enabled
        && path == cfg.health.liveness_path
        && matches!(*req.method(), Method::GET | Method::HEAD)
    {
        return http::build_health_response("ok").into();
    }

    // 1. Access validation
    let decision = {
        let headers = req.headers();
        check_access(
            &AccessRequest {
                origin: header_str(headers, ORIGIN.as_str()),
                referer: header_str(headers, REFERER.as_str()),
                api_key: header_str(headers, API_KEY_HEADER),
            },
            &cfg.access,
        )
    };
    let Some(allow_origin) = decision.allow_origin() else {
        logger::log_warning(&format!(
            "Access denied: origin={} path={path}",
            header_str(req.headers(), ORIGIN.as_str()).unwrap_or("-")
        ));
        return error_response(&RelayError::AccessDenied, None).into();
    };
    let cors = CorsHeaders::new(allow_origin, &cfg.cors);

    // 2. Preflight short-circuit, any path
    if *req.method() == Method::OPTIONS {
        return http::build_preflight_response(&cors).into();
    }

    // 3. Resolve upstream
    let target = match resolve(path, req.uri().query(), &cfg.upstream) {
        Ok(target) => target,
        Err(e) => return error_response(&e, Some(&cors)).into(),
    };
    logger::log_debug(&format!("{} {path} -> {target:?}", req.method()));

    // 4. Fetch and compose
    let result = match target {
        UpstreamTarget::ExposureDownload { primary, fallback } => {
            download(state, req.method(), vec![primary, fallback], &cors).await
        }
        UpstreamTarget::WorkspaceDownload { url } => {
            download(state, req.method(), vec![url], &cors).await
        }
        UpstreamTarget::Proxy { url, base } => forward(state, req, url, &base, &cors).await,
    };

    match result {
        Ok(outcome) => outcome,
        Err(e) => error_response(&e, Some(&cors)).into(),
    }
}

/// Archive downloads: candidates are tried in order, the first 2xx wins
async fn download(
    state: &AppState,
    method: &Method,
    candidates: Vec<url::Url>,
    cors: &CorsHeaders<'_>,
) -> Result<Outcome, RelayError> {
    let is_head = match *method {
        Method::GET => false,
        Method::HEAD => true,
        _ => return Err(RelayError::MethodNotAllowed),
    };

    let user_agent = &state.config.upstream.user_agent;
    let requests = candidates
        .into_iter()
        .map(|url| UpstreamRequest::download(url, user_agent))
        .collect();

    let (url, upstream) = fetch_first_success(state.fetcher.as_ref(), requests)
        .await
        .ok_or(RelayError::DownloadFailed)?;

    Ok(Outcome {
        response: http::build_relayed_response(upstream, cors, None, is_head),
        upstream: Some(url.to_string()),
    })
}

/// Generic reverse proxy: one attempt, redirects handed back to the client
async fn forward<B>(
    state: &AppState,
    req: Request<B>,
    url: url::Url,
    base: &url::Url,
    cors: &CorsHeaders<'_>,
) -> Result<Outcome, RelayError>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let max_body_size = state.config.relay.max_body_size;
    check_body_size(req.headers(), max_body_size)?;

    let (parts, body) = req.into_parts();
    let is_head = parts.method == Method::HEAD;
    let body = if matches!(parts.method, Method::GET | Method::HEAD) {
        Bytes::new()
    } else {
        read_body(body, max_body_size).await?
    };

    let upstream_req = UpstreamRequest {
        method: parts.method,
        headers: proxy::upstream_headers(&parts.headers, &url),
        url: url.clone(),
        body,
        follow_redirects: false,
    };

    let upstream = match state.fetcher.fetch(upstream_req).await {
        Ok(resp) => resp,
        Err(e) => {
            logger::log_upstream_failure(url.as_str(), &e.to_string());
            return Err(RelayError::ProxyFailed);
        }
    };

    let location = if proxy::is_redirect(upstream.status) {
        header_str(&upstream.headers, LOCATION.as_str()).and_then(|loc| {
            proxy::rewrite_location(loc, &url, base, &state.config.upstream.proxy_prefix)
        })
    } else {
        None
    };

    Ok(Outcome {
        response: http::build_relayed_response(upstream, cors, location.as_deref(), is_head),
        upstream: Some(url.to_string()),
    })
}

/// Reject declared bodies above the limit before reading anything
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Result<(), RelayError> {
    let Some(size_str) = header_str(headers, CONTENT_LENGTH.as_str()) else {
        return Ok(());
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(RelayError::PayloadTooLarge)
        }
        Ok(_) => Ok(()),
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            Ok(())
        }
    }
}

async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, RelayError>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(RelayError::PayloadTooLarge)
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(RelayError::BadRequest("Unreadable request body".to_string()))
        }
    }
}

fn error_response(err: &RelayError, cors: Option<&CorsHeaders<'_>>) -> Response<Full<Bytes>> {
    let mut resp = http::build_text_response(err.status(), &err.to_string(), cors);
    if *err == RelayError::MethodNotAllowed {
        resp.headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET, HEAD, OPTIONS"));
    }
    resp
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn start_access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let uri = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), ToString::to_string);
    let mut entry = AccessLogEntry::new(peer_addr.ip(), req.method().as_str(), uri);
    entry.http_version = match req.version() {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    };
    let headers = req.headers();
    entry.origin = header_str(headers, ORIGIN.as_str()).map(ToString::to_string);
    entry.referer = header_str(headers, REFERER.as_str()).map(ToString::to_string);
    entry.user_agent = header_str(headers, USER_AGENT.as_str()).map(ToString::to_string);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::relay::fetch::testing::ScriptedFetcher;
    use crate::relay::UpstreamResponse;
    use hyper::header::ACCESS_CONTROL_ALLOW_ORIGIN;
    use hyper::StatusCode;

    const APP: &str = "https://app.example.org";
    const MODELS: &str = "https://models.example.org";

    fn production_config() -> Config {
        Config::from_toml_str(
            r#"
            [logging]
            access_log = false

            [upstream]
            models_url = "https://models.example.org"
            proxy_target = "https://upstream"

            [access]
            api_key = "s3cret"
            allowed_origins = ["https://app.example.org"]

            [relay]
            max_body_size = 16
            "#,
        )
        .unwrap()
    }

    fn state(fetcher: ScriptedFetcher) -> (Arc<AppState>, Arc<ScriptedFetcher>) {
        let fetcher = Arc::new(fetcher);
        let state = Arc::new(AppState::new(production_config(), fetcher.clone()));
        (state, fetcher)
    }

    fn request(method: Method, uri: &str, origin: Option<&str>) -> Request<Full<Bytes>> {
        request_with_body(method, uri, origin, "")
    }

    fn request_with_body(
        method: Method,
        uri: &str,
        origin: Option<&str>,
        body: &'static str,
    ) -> Request<Full<Bytes>> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(origin) = origin {
            builder = builder.header("Origin", origin);
        }
        builder.body(Full::new(Bytes::from(body))).unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> Response<Full<Bytes>> {
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();
        handle_request(req, Arc::clone(state), peer).await.unwrap()
    }

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    fn short_url(alias: &str) -> String {
        format!("{MODELS}/e/{alias}/download_generated_omex")
    }

    fn long_url(alias: &str) -> String {
        format!("{MODELS}/exposure/{alias}/download_generated_omex")
    }

    #[tokio::test]
    async fn test_allow_listed_origin_is_accepted() {
        let (state, _) = state(ScriptedFetcher::new().respond(&short_url("foo"), 200, "omex"));
        let resp = send(&state, request(Method::GET, "/?exposureAlias=foo", Some(APP))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP);
        assert_eq!(body_of(resp).await, Bytes::from("omex"));
    }

    #[tokio::test]
    async fn test_unknown_origin_is_forbidden_without_upstream_call() {
        let (state, fetcher) =
            state(ScriptedFetcher::new().respond(&short_url("foo"), 200, "omex"));
        for origin in ["https://evil.test", "https://app.example.org:8443"] {
            let resp =
                send(&state, request(Method::GET, "/?exposureAlias=foo", Some(origin))).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
            assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
            assert_eq!(body_of(resp).await, Bytes::from("Forbidden: Access Denied!"));
        }
        assert!(fetcher.urls().is_empty());
    }

    #[tokio::test]
    async fn test_api_key_without_origin_is_accepted() {
        let (state, _) = state(ScriptedFetcher::new().respond(&short_url("foo"), 200, "omex"));
        let req = Request::builder()
            .uri("/download/exposure?alias=foo")
            .header("X-API-Key", "s3cret")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_options_never_reaches_upstream() {
        let (state, fetcher) = state(ScriptedFetcher::new());
        for uri in ["/", "/?exposureAlias=foo", "/cors-proxy/v1/items", "/unknown"] {
            let resp = send(&state, request(Method::OPTIONS, uri, Some(APP))).await;
            assert!(resp.status().is_success(), "{uri}");
            assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP);
            assert!(resp.headers().contains_key("access-control-allow-methods"));
            assert!(resp.headers().contains_key("access-control-allow-headers"));
            assert!(body_of(resp).await.is_empty());
        }
        assert!(fetcher.urls().is_empty());
    }

    #[tokio::test]
    async fn test_options_from_unknown_origin_is_forbidden() {
        let (state, _) = state(ScriptedFetcher::new());
        let resp = send(&state, request(Method::OPTIONS, "/", Some("https://evil.test"))).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_exposure_falls_back_to_long_url() {
        let (state, fetcher) = state(
            ScriptedFetcher::new()
                .respond(&short_url("foo"), 404, "not here")
                .respond(&long_url("foo"), 200, "long body"),
        );
        let resp = send(&state, request(Method::GET, "/?exposureAlias=foo", Some(APP))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_of(resp).await, Bytes::from("long body"));
        assert_eq!(fetcher.urls(), vec![short_url("foo"), long_url("foo")]);
    }

    #[tokio::test]
    async fn test_exposure_both_candidates_failing_is_500() {
        let (state, fetcher) = state(
            ScriptedFetcher::new()
                .respond(&short_url("foo"), 404, "")
                .respond(&long_url("foo"), 502, ""),
        );
        let resp = send(&state, request(Method::GET, "/?exposureAlias=foo", Some(APP))).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP);
        assert_eq!(body_of(resp).await, Bytes::from("Failed to fetch the file!"));
        assert_eq!(fetcher.urls().len(), 2);
    }

    #[tokio::test]
    async fn test_workspace_uses_default_zip_format() {
        let url = format!("{MODELS}/workspace/bar/@@archive/123/zip");
        let (state, fetcher) = state(ScriptedFetcher::new().respond(&url, 200, "zip"));
        let resp = send(
            &state,
            request(Method::GET, "/?workspaceAlias=bar&commitId=123", Some(APP)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(fetcher.urls()[0].ends_with("/bar/@@archive/123/zip"));
    }

    #[tokio::test]
    async fn test_workspace_single_attempt_failure_is_500() {
        let (state, fetcher) = state(ScriptedFetcher::new());
        let resp = send(
            &state,
            request(Method::GET, "/download/workspace?alias=bar&commitId=1&format=tgz", Some(APP)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(fetcher.urls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_parameters_is_400() {
        let (state, fetcher) = state(ScriptedFetcher::new());
        for uri in ["/", "/?workspaceAlias=bar", "/?commitId=123"] {
            let resp = send(&state, request(Method::GET, uri, Some(APP))).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP);
        }
        assert!(fetcher.urls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (state, _) = state(ScriptedFetcher::new());
        let resp = send(&state, request(Method::GET, "/elsewhere", Some(APP))).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_rejects_post() {
        let (state, fetcher) = state(ScriptedFetcher::new());
        let resp = send(&state, request(Method::POST, "/?exposureAlias=foo", Some(APP))).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "GET, HEAD, OPTIONS");
        assert!(fetcher.urls().is_empty());
    }

    #[tokio::test]
    async fn test_proxy_forwards_path_and_query() {
        let (state, fetcher) =
            state(ScriptedFetcher::new().respond("https://upstream/v1/items?x=1", 200, "[]"));
        let resp = send(
            &state,
            request(Method::GET, "/cors-proxy/v1/items?x=1", Some(APP)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_of(resp).await, Bytes::from("[]"));

        let seen = fetcher.seen.lock().unwrap();
        assert_eq!(seen[0].url.as_str(), "https://upstream/v1/items?x=1");
        assert!(!seen[0].follow_redirects);
        assert!(seen[0].headers.get(ORIGIN).is_none());
        assert_eq!(seen[0].headers["host"], "upstream");
    }

    #[tokio::test]
    async fn test_proxy_ignores_target_when_override_disabled() {
        let (state, fetcher) = state(ScriptedFetcher::new());
        let _ = send(
            &state,
            request(
                Method::GET,
                "/cors-proxy/v1/items?target=https%3A%2F%2Fevil.test",
                Some(APP),
            ),
        )
        .await;
        let urls = fetcher.urls();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("https://upstream/v1/items"));
    }

    #[tokio::test]
    async fn test_proxy_passes_upstream_errors_through() {
        let (state, _) =
            state(ScriptedFetcher::new().respond("https://upstream/v1/missing", 404, "nope"));
        let resp = send(&state, request(Method::GET, "/cors-proxy/v1/missing", Some(APP))).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(resp).await, Bytes::from("nope"));
    }

    #[tokio::test]
    async fn test_proxy_network_error_is_500() {
        let (state, _) = state(ScriptedFetcher::new());
        let resp = send(&state, request(Method::GET, "/cors-proxy/v1/items", Some(APP))).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(resp).await, Bytes::from("Proxy request failed"));
    }

    #[tokio::test]
    async fn test_proxy_redirect_location_is_rewritten() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("https://upstream/foo"));
        let (state, _) = state(ScriptedFetcher::new().respond_with(
            "https://upstream/bar",
            UpstreamResponse {
                status: StatusCode::FOUND,
                headers,
                body: Bytes::new(),
            },
        ));
        let resp = send(&state, request(Method::GET, "/cors-proxy/bar", Some(APP))).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[LOCATION], "/cors-proxy/foo");
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP);
    }

    #[tokio::test]
    async fn test_proxy_get_drops_declared_body_length() {
        let (state, fetcher) =
            state(ScriptedFetcher::new().respond("https://upstream/v1", 200, "ok"));
        let req = Request::builder()
            .uri("/cors-proxy/v1")
            .header("Origin", APP)
            .header(CONTENT_LENGTH, "5")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let seen = fetcher.seen.lock().unwrap();
        assert!(seen[0].body.is_empty());
        assert!(seen[0].headers.get(CONTENT_LENGTH).is_none());
    }

    #[tokio::test]
    async fn test_proxy_head_keeps_upstream_length() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1234"));
        let (state, fetcher) = state(ScriptedFetcher::new().respond_with(
            "https://upstream/files/model.omex",
            UpstreamResponse {
                status: StatusCode::OK,
                headers,
                body: Bytes::new(),
            },
        ));
        let resp = send(
            &state,
            request(Method::HEAD, "/cors-proxy/files/model.omex", Some(APP)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "1234");
        assert!(body_of(resp).await.is_empty());
        assert_eq!(fetcher.seen.lock().unwrap()[0].method, Method::HEAD);
    }

    #[tokio::test]
    async fn test_proxy_forwards_body_for_post() {
        let (state, fetcher) =
            state(ScriptedFetcher::new().respond("https://upstream/v1/items", 201, "created"));
        let resp = send(
            &state,
            request_with_body(Method::POST, "/cors-proxy/v1/items", Some(APP), "{\"a\":1}"),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let seen = fetcher.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::POST);
        assert_eq!(seen[0].body, Bytes::from("{\"a\":1}"));
    }

    #[tokio::test]
    async fn test_proxy_rejects_oversized_body() {
        let (state, fetcher) = state(ScriptedFetcher::new());
        let resp = send(
            &state,
            request_with_body(
                Method::POST,
                "/cors-proxy/v1/items",
                Some(APP),
                "this body is longer than sixteen bytes",
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(fetcher.urls().is_empty());
    }

    #[tokio::test]
    async fn test_health_skips_access_check() {
        let (state, _) = state(ScriptedFetcher::new());
        let resp = send(&state, request(Method::GET, "/healthz", None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_of(resp).await, Bytes::from(r#"{"status":"ok"}"#));
    }

    #[test]
    fn test_check_body_size() {
        let mut headers = HeaderMap::new();
        assert!(check_body_size(&headers, 10).is_ok());
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("11"));
        assert_eq!(check_body_size(&headers, 10), Err(RelayError::PayloadTooLarge));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("abc"));
        assert!(check_body_size(&headers, 10).is_ok());
    }

    #[test]
    fn test_access_entry_captures_request() {
        let req = Request::builder()
            .uri("/?exposureAlias=foo")
            .header("Origin", APP)
            .header("User-Agent", "curl/8")
            .body(())
            .unwrap();
        let entry = start_access_entry(&req, "10.1.2.3:4444".parse().unwrap());
        assert_eq!(entry.uri, "/?exposureAlias=foo");
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.origin.as_deref(), Some(APP));
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8"));
        assert!(entry.referer.is_none());
    }
}
