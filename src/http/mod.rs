//! HTTP protocol layer module
//!
//! Response builders shared by the relay handler and the router.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_404_response, build_413_response, build_error_response, build_preflight_response,
    build_relay_response,
};
