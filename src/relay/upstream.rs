//! Outbound call to the Bot API `sendMessage` method

use hyper::body::Bytes;
use hyper::StatusCode;
use serde::Serialize;

use super::error::RelayError;
use crate::config::UpstreamConfig;

/// JSON body posted upstream
#[derive(Debug, Serialize)]
pub struct OutboundMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'a str,
}

/// Raw upstream reply, relayed to the caller as-is
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Send one message. Any HTTP status counts as success here; only transport
/// failures and timeouts are errors.
pub async fn send_message(
    client: &reqwest::Client,
    upstream: &UpstreamConfig,
    token: &str,
    message: &OutboundMessage<'_>,
) -> Result<UpstreamReply, RelayError> {
    // `.json()` sets Content-Type: application/json.
    // `without_url` keeps the bot token out of error messages.
    let response = client
        .post(upstream.send_message_url(token))
        .json(message)
        .send()
        .await
        .map_err(reqwest::Error::without_url)?;

    let status = response.status();
    let body = response.bytes().await.map_err(reqwest::Error::without_url)?;

    Ok(UpstreamReply { status, body })
}
