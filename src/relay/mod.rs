//! Relay core: who may call, where the request goes, and how upstream
//! responses are fetched and rewritten.

pub mod access;
pub mod error;
pub mod fetch;
pub mod proxy;
pub mod resolve;

pub use access::{check_access, AccessRequest};
pub use error::RelayError;
pub use fetch::{
    fetch_first_success, Fetcher, ReqwestFetcher, UpstreamRequest, UpstreamResponse,
};
pub use resolve::{resolve, UpstreamTarget};
