//! Shared test helpers: app state construction and an in-process upstream double

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use crate::config::{AppState, Config};

/// Default configuration pointed at `base_url`, access log off
pub fn test_config(base_url: &str) -> Config {
    let mut cfg = Config::load_from("does-not-exist/relay-config").unwrap();
    cfg.logging.access_log = false;
    cfg.upstream.base_url = base_url.to_string();
    cfg.upstream.timeout_secs = 5;
    cfg
}

/// App state for `cfg`; the client ignores proxy environment variables
pub fn state_for(cfg: &Config) -> Arc<AppState> {
    let mut state = AppState::new(cfg).unwrap();
    state.client = reqwest::Client::builder()
        .no_proxy()
        .timeout(std::time::Duration::from_secs(cfg.upstream.timeout_secs))
        .build()
        .unwrap();
    Arc::new(state)
}

pub fn test_state(base_url: &str) -> Arc<AppState> {
    state_for(&test_config(base_url))
}

/// One request as the upstream double saw it
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RecordedCall {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Upstream double answering every request with a fixed status and body
pub struct MockUpstream {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockUpstream {
    pub async fn start(status: StatusCode, reply_body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&calls);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                        let recorded = Arc::clone(&recorded);
                        async move {
                            let method = req.method().to_string();
                            let path = req.uri().path().to_string();
                            let content_type = req
                                .headers()
                                .get(hyper::header::CONTENT_TYPE)
                                .and_then(|v| v.to_str().ok())
                                .map(ToString::to_string);
                            let body = req.into_body().collect().await?.to_bytes();
                            recorded.lock().unwrap().push(RecordedCall {
                                method,
                                path,
                                content_type,
                                body,
                            });
                            Ok::<_, hyper::Error>(
                                Response::builder()
                                    .status(status)
                                    .header("Content-Type", "application/json")
                                    .body(Full::new(Bytes::from_static(reply_body.as_bytes())))
                                    .unwrap(),
                            )
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr, calls }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

/// Upstream that accepts connections and never answers
pub async fn silent_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("http://{addr}")
}

/// An address with nothing listening on it
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Collect a response body
pub async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
    resp.into_body().collect().await.unwrap().to_bytes()
}

/// Request with an empty body
pub fn empty_request(method: &str, uri: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// POST with a form-encoded body
pub fn form_request(uri: &str, form: &'static str) -> Request<Full<Bytes>> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .header("Content-Length", form.len())
        .body(Full::new(Bytes::from_static(form.as_bytes())))
        .unwrap()
}

/// POST with a `multipart/form-data` body holding `fields` as text parts
pub fn multipart_request(uri: &str, fields: &[(&str, &str)]) -> Request<Full<Bytes>> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--relay-boundary\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str("--relay-boundary--\r\n");

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "multipart/form-data; boundary=relay-boundary")
        .header("Content-Length", body.len())
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}
