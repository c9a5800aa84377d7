//! HTTP protocol layer module
//!
//! Response builders, CORS headers and header filtering, decoupled from the
//! relay decisions that use them.

pub mod cors;
pub mod headers;
pub mod response;

// Re-export commonly used types
pub use cors::CorsHeaders;
pub use response::{
    build_health_response, build_preflight_response, build_relayed_response, build_text_response,
};
