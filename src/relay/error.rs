//! Error taxonomy for the relay pipeline.

use hyper::StatusCode;

/// Reasons a request ends without an upstream response being relayed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RelayError {
    /// Origin/key check failed; no upstream call was made.
    #[error("Forbidden: Access Denied!")]
    AccessDenied,

    /// Required parameters are missing or the proxy target is not usable.
    #[error("Bad Request: {0}")]
    BadRequest(String),

    /// No route matches the path.
    #[error("Not Found")]
    NotFound,

    /// The route exists but does not accept the method.
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// The request body exceeds `relay.max_body_size`.
    #[error("Payload Too Large")]
    PayloadTooLarge,

    /// Every download candidate failed.
    #[error("Failed to fetch the file!")]
    DownloadFailed,

    /// The proxied request could not be completed.
    #[error("Proxy request failed")]
    ProxyFailed,
}

impl RelayError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::DownloadFailed | Self::ProxyFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Transport-level failure talking to an upstream.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream transport error: {0}")]
    Transport(String),

    #[error("upstream body read failed: {0}")]
    Body(String),
}
