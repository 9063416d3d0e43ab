use anyhow::Result;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Waits for ctrl-c or, on Unix, SIGTERM and cancels `cancelation`. The token is cancelled
/// even if a signal handler couldn't be installed, so the daemon never outlives a broken
/// listener.
pub async fn detect_shutdown(cancelation: CancellationToken) -> Result<()> {
    let result = wait_for_signal(&cancelation).await;
    cancelation.cancel();
    result
}

async fn wait_for_signal(cancelation: &CancellationToken) -> Result<()> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    #[cfg(unix)]
    let terminated = terminate.recv();
    #[cfg(not(unix))]
    let terminated = std::future::pending::<Option<()>>();

    select! {
        result = tokio::signal::ctrl_c() => {
            info!("Received ctrl-c, shutting down");
            result?;
        },
        _ = terminated => {
            info!("Received termination signal, shutting down");
        },
        _ = cancelation.cancelled() => (),
    };
    Ok(())
}
