//! Relay flow for the root path: extract, validate, normalize, send, pass through

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Response, StatusCode};

use super::error::RelayError;
use super::normalize::normalize_text;
use super::params::{FormParams, MultipartParams, QueryParams, RelayParams, MISSING_PARAMS};
use super::upstream::{send_message, OutboundMessage, UpstreamReply};
use crate::config::AppState;
use crate::http;
use crate::logger;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Handle one request to `/` (preflight excluded).
///
/// POST reads the body (multipart when declared so, urlencoded otherwise),
/// every other method the query string.
pub async fn relay_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let params = if req.method() == Method::POST {
        let multipart_type = multipart_content_type(&req);
        let body = match read_body(req, state.config.http.max_body_size).await {
            Ok(body) => body,
            Err(BodyError::TooLarge) => return http::build_413_response(),
            Err(BodyError::Read(e)) => return relay_error(&e),
        };
        match multipart_type {
            Some(content_type) => match MultipartParams::parse(&content_type, body).await {
                Ok(fields) => RelayParams::extract(&fields),
                Err(e) => return relay_error(&RelayError::from(e)),
            },
            None => RelayParams::extract(&FormParams(&body)),
        }
    } else {
        RelayParams::extract(&QueryParams(req.uri().query().unwrap_or("")))
    };

    let Some(params) = params else {
        logger::log_error(MISSING_PARAMS);
        return http::build_error_response(StatusCode::BAD_REQUEST, MISSING_PARAMS);
    };

    match forward(&params, state).await {
        Ok(reply) => http::build_relay_response(reply.status, reply.body),
        Err(e) => relay_error(&e),
    }
}

/// Normalize the text and make the single outbound call
async fn forward(params: &RelayParams, state: &AppState) -> Result<UpstreamReply, RelayError> {
    let text = normalize_text(&params.text, params.origin)?;
    logger::log_relay_attempt(&params.chat_id, text.chars().count(), &params.parse_mode);

    let message = OutboundMessage {
        chat_id: &params.chat_id,
        text: &text,
        parse_mode: &params.parse_mode,
    };
    let reply = send_message(&state.client, &state.config.upstream, &params.token, &message).await?;

    logger::log_upstream_response(reply.status.as_u16(), &reply.body);
    Ok(reply)
}

fn relay_error(err: &RelayError) -> Response<Full<Bytes>> {
    let description = err.description();
    logger::log_error(&description);
    http::build_error_response(StatusCode::INTERNAL_SERVER_ERROR, &description)
}

/// The declared Content-Type when it is `multipart/form-data`
fn multipart_content_type<B>(req: &Request<B>) -> Option<String> {
    let value = req.headers().get(CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next().unwrap_or_default().trim();
    essence
        .eq_ignore_ascii_case("multipart/form-data")
        .then(|| value.to_string())
}

enum BodyError {
    TooLarge,
    Read(RelayError),
}

/// Collect the request body, bounded by `max_body_size`
async fn read_body<B>(req: Request<B>, max_body_size: u64) -> Result<Bytes, BodyError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeds {max_body_size} bytes"));
            Err(BodyError::TooLarge)
        }
        Err(e) => Err(BodyError::Read(RelayError::Body(e.to_string()))),
    }
}
