//! Request handler module
//!
//! Routes inbound requests; the relay itself lives in `crate::relay`.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
