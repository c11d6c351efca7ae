// Server module entry
// Listener setup, accept loop, connection serving and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

pub use listener::create_reusable_listener;

/// Accept connections until `shutdown` resolves.
///
/// In-flight connections are left to finish on their own tasks; the listener
/// is closed as soon as this returns.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = &'static str>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            reason = &mut shutdown => {
                logger::log_shutdown(&format!("{reason} received"));
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{silent_upstream, state_for, test_config, test_state, MockUpstream};
    use hyper::StatusCode;

    /// Serve `state` on an ephemeral port until the returned sender fires
    fn spawn_server(
        state: Arc<AppState>,
    ) -> (std::net::SocketAddr, tokio::sync::oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, state, async move {
            let _ = rx.await;
            "test signal"
        }));
        (addr, tx, server)
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let upstream = MockUpstream::start(StatusCode::OK, r#"{"ok":true}"#).await;
        let (addr, tx, server) = spawn_server(test_state(&upstream.base_url()));

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let resp = client
            .post(format!("http://{addr}/"))
            .form(&[("token", "t"), ("chat_id", "1"), ("text", "hi%0Athere")])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(resp.text().await.unwrap(), r#"{"ok":true}"#);
        assert_eq!(upstream.calls()[0].json()["text"], "hi\nthere");

        tx.send(()).unwrap();
        server.await.unwrap();
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_slow_upstream_outlives_read_timeout() {
        // The request head arrives at once; only the upstream is slow
        let mut cfg = test_config(&silent_upstream().await);
        cfg.performance.read_timeout = 1;
        cfg.upstream.timeout_secs = 3;
        let (addr, tx, server) = spawn_server(state_for(&cfg));

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let resp = client
            .get(format!("http://{addr}/?token=t&chat_id=1&text=hi"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 500);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error_code"], 500);
        let description = body["description"].as_str().unwrap();
        assert!(description.starts_with("Proxy error: "), "{description}");

        tx.send(()).unwrap();
        server.await.unwrap();
    }
}
