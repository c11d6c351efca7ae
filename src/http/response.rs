//! HTTP response building module
//!
//! Builders for every response the relay emits. All of them carry
//! `Access-Control-Allow-Origin: *`.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use hyper::{Response, StatusCode};
use serde::Serialize;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Error envelope in the Bot API's own `ok: false` shape
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope<'a> {
    pub ok: bool,
    pub error_code: u16,
    pub description: &'a str,
}

/// Build the CORS preflight response: 200, empty body, no `Content-Type`
pub fn build_preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN)
        .header(ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS)
        .header(ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    plain_text(StatusCode::NOT_FOUND, "Not Found")
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    plain_text(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
}

/// Build an `ok: false` JSON error response with the same status and `error_code`
pub fn build_error_response(status: StatusCode, description: &str) -> Response<Full<Bytes>> {
    let envelope = ErrorEnvelope {
        ok: false,
        error_code: status.as_u16(),
        description,
    };
    let json = match serde_json::to_vec(&envelope) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize error envelope: {e}"));
            br#"{"ok":false}"#.to_vec()
        }
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Pass an upstream reply through: status and body untouched, JSON + full CORS headers
pub fn build_relay_response(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN)
        .header(ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS)
        .header(ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn plain_text(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN)
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from_static(text.as_bytes())))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_preflight() {
        let resp = build_preflight_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        assert!(body_of(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_not_found() {
        let resp = build_404_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(body_of(resp).await, "Not Found");
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let resp = build_error_response(StatusCode::BAD_REQUEST, "bad \"input\"");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
        assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_METHODS).is_none());

        let value: serde_json::Value = serde_json::from_slice(&body_of(resp).await).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"ok": false, "error_code": 400, "description": "bad \"input\""})
        );
    }

    #[tokio::test]
    async fn test_relay_passthrough() {
        let upstream = Bytes::from_static(br#"{"ok":false,"error_code":403,"description":"Forbidden"}"#);
        let resp = build_relay_response(StatusCode::FORBIDDEN, upstream.clone());
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        assert_eq!(body_of(resp).await, upstream);
    }
}
