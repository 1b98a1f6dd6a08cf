//! # OS termination trigger used by `ApplicationBus::run`.
//!
//! Unix listens for `SIGINT`, `SIGTERM` and `SIGQUIT`; other platforms for Ctrl-C.
//! A listener that cannot be installed is skipped. With none left the trigger
//! never fires and the bus stops only through the stop command or its parent.

use tracing::warn;

/// Completes on the first OS termination signal.
#[cfg(unix)]
pub(crate) async fn os_signal() {
    use futures::future::select_all;
    use tokio::signal::unix::{signal, SignalKind};

    let mut streams = Vec::new();
    for kind in [SignalKind::interrupt(), SignalKind::terminate(), SignalKind::quit()] {
        match signal(kind) {
            Ok(stream) => streams.push(stream),
            Err(err) => warn!(error = %err, signal = ?kind, "signal listener unavailable"),
        }
    }

    if streams.is_empty() {
        warn!("no os signal listener; waiting for stop command");
        return std::future::pending().await;
    }

    select_all(streams.iter_mut().map(|s| Box::pin(s.recv()))).await;
}

/// Completes on Ctrl-C.
#[cfg(not(unix))]
pub(crate) async fn os_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "ctrl-c listener unavailable; waiting for stop command");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_os_signal_pending_without_signal() {
        let fired = tokio::time::timeout(Duration::from_millis(50), os_signal()).await;
        assert!(fired.is_err());
    }
}
