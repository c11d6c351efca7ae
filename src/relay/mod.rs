//! Telegram message relay
//!
//! Turns one inbound request into at most one `sendMessage` call and hands the
//! upstream reply back unchanged.

mod error;
mod forward;
mod normalize;
mod params;
mod upstream;

pub use forward::relay_request;
