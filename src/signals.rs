// ABOUTME: Turns SIGINT/SIGTERM into a cancelled shutdown token
// ABOUTME: Installed by the binary only; libraries and tests never touch process signals

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancel `token` on the first SIGINT or SIGTERM
pub fn spawn_shutdown_on_signal(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let signal = tokio::select! {
            name = wait_for_signal() => name,
            _ = token.cancelled() => return,
        };
        tracing::info!(signal, "Shutdown signal received");
        token.cancel();
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler, listening for Ctrl-C only");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        name = ctrl_c() => name,
        _ = sigterm.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
