//! # Lifecycle controller: run gate and bounded graceful shutdown.
//!
//! ## States
//! ```text
//! Idle ──run()──► Running ──trigger──► ShuttingDown ──grace/all stopped──► Stopped
//!   │                                      ▲
//!   └──────── stop command / parent ───────┘   (Stopped is terminal)
//! ```
//!
//! ## Shutdown path
//! ```text
//! shutdown()
//!   ├─► first caller only (started flag):
//!   │     ├─► ctx.cancel()                    → subscribers start winding down
//!   │     └─► spawn: timeout(grace, all stopped signals)
//!   │            ├─ Ok      → ShutdownOutcome::AllStopped
//!   │            ├─ Elapsed → ShutdownOutcome::GraceExceeded { pending }
//!   │            └─► store report, released.cancel()
//!   └─► every caller: await released, read the stored report
//! ```
//!
//! The bounded wait runs on its own task, so dropping a caller (a timed out
//! `stop()`, an aborted `run()`) neither cancels nor restarts it.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Observable state of the bus lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusState {
    /// Created, `run` not entered yet.
    Idle,
    /// `run` is waiting for a termination trigger.
    Running,
    /// Context cancelled, waiting for stopped signals.
    ShuttingDown,
    /// Terminal.
    Stopped,
}

impl BusState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => BusState::Idle,
            1 => BusState::Running,
            2 => BusState::ShuttingDown,
            _ => BusState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            BusState::Idle => 0,
            BusState::Running => 1,
            BusState::ShuttingDown => 2,
            BusState::Stopped => 3,
        }
    }
}

/// How the bounded shutdown wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every stopped signal fired within the grace period.
    AllStopped,
    /// The grace period elapsed first.
    GraceExceeded {
        /// Subscribers that had not signalled when the grace period ended.
        pending: Vec<&'static str>,
    },
}

/// Result of a completed shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Configured grace period.
    pub grace: Duration,
    /// How the wait ended.
    pub outcome: ShutdownOutcome,
}

impl ShutdownReport {
    /// Returns `true` if every subscriber signalled in time.
    #[inline]
    pub fn is_clean(&self) -> bool {
        matches!(self.outcome, ShutdownOutcome::AllStopped)
    }
}

/// Completion signal of one subscriber.
pub(crate) struct StopSignal {
    pub(crate) subscriber: &'static str,
    pub(crate) token: CancellationToken,
}

pub(crate) struct Lifecycle {
    state: AtomicU8,
    /// Bus context handed to providers; cancelled when shutdown starts.
    ctx: CancellationToken,
    /// Cancelled once shutdown has finished.
    released: CancellationToken,
    awaited: OnceLock<Vec<StopSignal>>,
    started: AtomicBool,
    report: OnceLock<ShutdownReport>,
    grace: Duration,
}

impl Lifecycle {
    pub(crate) fn new(ctx: CancellationToken, grace: Duration) -> Self {
        Self {
            state: AtomicU8::new(BusState::Idle.as_u8()),
            ctx,
            released: CancellationToken::new(),
            awaited: OnceLock::new(),
            started: AtomicBool::new(false),
            report: OnceLock::new(),
            grace,
        }
    }

    pub(crate) fn state(&self) -> BusState {
        BusState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: BusState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    pub(crate) fn context(&self) -> &CancellationToken {
        &self.ctx
    }

    /// Installs the await-list collected by `build`. Only the first call wins.
    pub(crate) fn set_awaited(&self, signals: Vec<StopSignal>) {
        if let Err(rejected) = self.awaited.set(signals) {
            warn!(
                rejected = rejected.len(),
                "await-list already installed; keeping the first one"
            );
        }
    }

    /// Moves `Idle → Running`.
    ///
    /// Returns the state observed instead when the transition is not possible.
    pub(crate) fn enter_running(&self) -> Result<(), BusState> {
        self.state
            .compare_exchange(
                BusState::Idle.as_u8(),
                BusState::Running.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(BusState::from_u8)
    }

    /// Waits until shutdown has completed.
    pub(crate) async fn released(&self) {
        self.released.cancelled().await;
    }

    /// Runs shutdown once; every caller gets the same report.
    ///
    /// The first call cancels the context and spawns the bounded wait. Dropping
    /// any caller, the first included, leaves that wait running.
    pub(crate) async fn shutdown(self: &Arc<Self>) -> ShutdownReport {
        if !self.started.swap(true, Ordering::AcqRel) {
            self.set_state(BusState::ShuttingDown);
            info!(grace = ?self.grace, "shutdown requested");
            self.ctx.cancel();

            let this = Arc::clone(self);
            tokio::spawn(async move { this.drive().await });
        }

        self.released.cancelled().await;
        self.report.get().cloned().unwrap_or_else(|| self.snapshot())
    }

    async fn drive(&self) {
        let signals = self.signals();
        let all = join_all(signals.iter().map(|s| s.token.cancelled()));

        let report = match tokio::time::timeout(self.grace, all).await {
            Ok(_) => {
                info!(subscribers = signals.len(), "all subscribers stopped within grace");
                self.snapshot()
            }
            Err(_) => {
                let report = self.snapshot();
                warn!(grace = ?self.grace, outcome = ?report.outcome, "grace exceeded; abandoning subscribers");
                report
            }
        };

        let _ = self.report.set(report);
        self.set_state(BusState::Stopped);
        self.released.cancel();
    }

    fn signals(&self) -> &[StopSignal] {
        self.awaited.get().map(Vec::as_slice).unwrap_or_default()
    }

    /// Report built from the stopped signals as they are right now.
    fn snapshot(&self) -> ShutdownReport {
        let pending: Vec<&'static str> = self
            .signals()
            .iter()
            .filter(|s| !s.token.is_cancelled())
            .map(|s| s.subscriber)
            .collect();

        let outcome = if pending.is_empty() {
            ShutdownOutcome::AllStopped
        } else {
            ShutdownOutcome::GraceExceeded { pending }
        };
        ShutdownReport {
            grace: self.grace,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn lifecycle(grace: Duration, tokens: &[(&'static str, CancellationToken)]) -> Arc<Lifecycle> {
        let lc = Arc::new(Lifecycle::new(CancellationToken::new(), grace));
        lc.set_awaited(
            tokens
                .iter()
                .map(|(name, token)| StopSignal {
                    subscriber: *name,
                    token: token.clone(),
                })
                .collect(),
        );
        lc
    }

    #[tokio::test(start_paused = true)]
    async fn test_prompt_return_when_signalled() {
        let stopped = CancellationToken::new();
        let lc = lifecycle(Duration::from_secs(10), &[("worker", stopped.clone())]);

        let ctx = lc.context().clone();
        tokio::spawn(async move {
            ctx.cancelled().await;
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopped.cancel();
        });

        let started = Instant::now();
        let report = lc.shutdown().await;
        assert!(report.is_clean());
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(lc.state(), BusState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_grace_when_never_signalled() {
        let never = CancellationToken::new();
        let done = CancellationToken::new();
        done.cancel();
        let lc = lifecycle(
            Duration::from_secs(3),
            &[("stuck", never), ("done", done)],
        );

        let started = Instant::now();
        let report = lc.shutdown().await;
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert_eq!(
            report.outcome,
            ShutdownOutcome::GraceExceeded {
                pending: vec!["stuck"]
            }
        );
    }

    #[tokio::test]
    async fn test_shutdown_runs_once() {
        let lc = lifecycle(Duration::from_secs(1), &[]);
        let (a, b) = tokio::join!(lc.shutdown(), lc.shutdown());
        assert_eq!(a, b);
        assert!(lc.context().is_cancelled());

        let again = lc.shutdown().await;
        assert_eq!(again, a);
        lc.released().await;
    }

    #[test]
    fn test_enter_running_only_from_idle() {
        let lc = Lifecycle::new(CancellationToken::new(), Duration::ZERO);
        assert_eq!(lc.enter_running(), Ok(()));
        assert_eq!(lc.state(), BusState::Running);
        assert_eq!(lc.enter_running(), Err(BusState::Running));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_caller_does_not_restart_wait() {
        let lc = lifecycle(Duration::from_secs(1), &[("stuck", CancellationToken::new())]);
        let started = Instant::now();

        let first = tokio::time::timeout(Duration::from_millis(500), lc.shutdown()).await;
        assert!(first.is_err());
        assert_eq!(lc.state(), BusState::ShuttingDown);

        let report = lc.shutdown().await;
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert!(started.elapsed() < Duration::from_millis(1500));
        assert_eq!(
            report.outcome,
            ShutdownOutcome::GraceExceeded {
                pending: vec!["stuck"]
            }
        );
        assert_eq!(lc.state(), BusState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_list_installed_once() {
        let lc = lifecycle(Duration::from_millis(100), &[("stuck", CancellationToken::new())]);
        lc.set_awaited(Vec::new());

        let report = lc.shutdown().await;
        assert!(!report.is_clean());
    }
}
