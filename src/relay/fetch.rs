//! Upstream fetching.
//!
//! The pipeline talks to upstreams through the [`Fetcher`] trait. The
//! production implementation is [`ReqwestFetcher`].

use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ACCEPT, REFERER, USER_AGENT};
use hyper::{HeaderMap, Method, StatusCode};
use url::Url;

use super::error::FetchError;
use crate::logger;

/// One outbound request
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Follow 3xx responses instead of returning them
    pub follow_redirects: bool,
}

impl UpstreamRequest {
    /// Plain GET used for archive downloads
    pub fn download(url: Url, user_agent: &str) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, v);
        }
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        // Some repositories refuse hot-linked downloads without a same-site referer
        if let Ok(v) = HeaderValue::from_str(&format!("{}/", url.origin().ascii_serialization())) {
            headers.insert(REFERER, v);
        }
        Self {
            method: Method::GET,
            url,
            headers,
            body: Bytes::new(),
            follow_redirects: true,
        }
    }
}

/// Upstream answer, fully buffered
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, req: UpstreamRequest) -> Result<UpstreamResponse, FetchError>;
}

/// `reqwest`-backed fetcher with one client per redirect policy
pub struct ReqwestFetcher {
    following: reqwest::Client,
    manual: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            following: reqwest::Client::builder().build()?,
            manual: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()?,
        })
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, req: UpstreamRequest) -> Result<UpstreamResponse, FetchError> {
        let client = if req.follow_redirects {
            &self.following
        } else {
            &self.manual
        };

        let mut builder = client
            .request(req.method.clone(), req.url)
            .headers(req.headers);
        if !req.body.is_empty() {
            builder = builder.body(req.body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// Try each candidate in order and return the first 2xx response.
///
/// Candidates are fetched one after another, never concurrently. Returns
/// `None` when every candidate failed or answered with a non-success status.
pub async fn fetch_first_success(
    fetcher: &dyn Fetcher,
    candidates: Vec<UpstreamRequest>,
) -> Option<(Url, UpstreamResponse)> {
    for req in candidates {
        let url = req.url.clone();
        match fetcher.fetch(req).await {
            Ok(resp) if resp.status.is_success() => return Some((url, resp)),
            Ok(resp) => logger::log_upstream_failure(url.as_str(), &resp.status.to_string()),
            Err(e) => logger::log_upstream_failure(url.as_str(), &e.to_string()),
        }
    }
    None
}
