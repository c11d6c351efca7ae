// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

/// Resolve once a shutdown signal arrives, yielding its name.
///
/// If a handler cannot be registered the error is logged and that signal is
/// never observed; the other one still works.
#[cfg(unix)]
pub async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let sigterm = signal(SignalKind::terminate());
    let sigint = signal(SignalKind::interrupt());

    let wait = |sig: std::io::Result<tokio::signal::unix::Signal>, name: &'static str| async move {
        match sig {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                crate::logger::log_error(&format!("Failed to register {name} handler: {e}"));
                std::future::pending::<()>().await;
            }
        }
        name
    };

    tokio::select! {
        name = wait(sigterm, "SIGTERM") => name,
        name = wait(sigint, "SIGINT") => name,
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        crate::logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
    "Ctrl+C"
}
