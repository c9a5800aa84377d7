//! Request handler module
//!
//! Runs the relay pipeline for each inbound request.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
