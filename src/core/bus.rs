//! # ApplicationBus: build, dispatch and run.
//!
//! The [`ApplicationBus`] owns the routing table and the lifecycle controller.
//! It is a cheap `Clone` handle; providers receive one so subscribers can query
//! their peers.
//!
//! ## Build
//! ```text
//! build(providers)
//!   ├─► register self-handler for BusStop
//!   ├─► provider(ctx, bus) for each provider (input order)
//!   │     └─► build_options() read once
//!   ├─► stable sort by order (ascending)
//!   ├─► register supported events in sorted order, collect stopped signals
//!   ├─► freeze routing table (read-only from here on)
//!   └─► exec_command(BusInitialized) → handlers in ascending order
//! ```
//!
//! ## Dispatch rules
//! - **Query**: only the first registered subscriber is asked (first match wins);
//!   later registrations for the same name are never reached.
//! - **Command**: every registered subscriber in order, until one stops propagation.
//! - **Multi-query**: one spawned task per query, joined before returning; results
//!   keep input order.
//! - Unmatched names are not errors: queries yield [`QueryResult::Unrouted`],
//!   commands are no-ops.
//!
//! ## Run
//! `run()` waits for an OS termination signal, the internal stop command or the
//! cancellation of the parent context, whichever comes first, then drives the
//! one-shot graceful shutdown.

use std::any::{Any, TypeId};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::config::BusConfig;
use super::lifecycle::{BusState, Lifecycle, ShutdownReport, StopSignal};
use super::registry::{Registry, RegistryBuilder};
use super::shutdown;
use crate::error::{BuildError, QueryError, RuntimeError};
use crate::events::{
    AnyCommand, AnyQuery, BusInitialized, BusStop, Event, EventName, Query, QueryResult,
};
use crate::subscribers::{Provider, Subscriber, SubscriberOptions};

/// In-process query/command bus.
#[derive(Clone)]
pub struct ApplicationBus {
    inner: Arc<Inner>,
}

struct Inner {
    registry: OnceLock<Registry>,
    building: AtomicBool,
    lifecycle: Arc<Lifecycle>,
    query_limit: Option<Arc<Semaphore>>,
}

impl ApplicationBus {
    /// Creates an unbuilt bus with its own root context.
    pub fn new(cfg: BusConfig) -> Self {
        Self::with_context(cfg, CancellationToken::new())
    }

    /// Creates an unbuilt bus whose context is a child of `parent`.
    ///
    /// Cancelling `parent` drives the same graceful shutdown as a stop command.
    pub fn with_parent(cfg: BusConfig, parent: &CancellationToken) -> Self {
        Self::with_context(cfg, parent.child_token())
    }

    fn with_context(cfg: BusConfig, ctx: CancellationToken) -> Self {
        let query_limit = cfg
            .query_concurrency_limit()
            .map(Semaphore::new)
            .map(Arc::new);

        Self {
            inner: Arc::new(Inner {
                registry: OnceLock::new(),
                building: AtomicBool::new(false),
                lifecycle: Arc::new(Lifecycle::new(ctx, cfg.grace)),
                query_limit,
            }),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BusState {
        self.inner.lifecycle.state()
    }

    /// Bus context; cancelled when shutdown starts.
    pub fn context(&self) -> CancellationToken {
        self.inner.lifecycle.context().clone()
    }

    /// Returns `true` once the routing table is frozen.
    pub fn is_built(&self) -> bool {
        self.inner.registry.get().is_some()
    }

    /// Number of distinct routed event names (including the internal stop command).
    pub fn route_count(&self) -> usize {
        self.registry().map_or(0, Registry::len)
    }

    /// Number of subscribers registered for `name`.
    pub fn handler_count(&self, name: EventName) -> usize {
        self.registry().map_or(0, |r| r.lookup(name).len())
    }

    fn registry(&self) -> Option<&Registry> {
        self.inner.registry.get()
    }

    // ---------------------------
    // Build
    // ---------------------------

    /// Constructs every subscriber, freezes the routing table and dispatches
    /// [`BusInitialized`] in ascending order.
    ///
    /// Panics raised by providers are not caught.
    ///
    /// A failed build is final: the bus context is cancelled so subscribers
    /// constructed so far wind down, and the bus cannot be built again.
    pub async fn build(&self, providers: Vec<Provider>) -> Result<(), BuildError> {
        if self.inner.building.swap(true, Ordering::AcqRel) {
            return Err(BuildError::AlreadyBuilt);
        }

        let (registry, awaited, subscribers) = match self.assemble(providers) {
            Ok(parts) => parts,
            Err(err) => {
                warn!(error = %err, "build failed; cancelling bus context");
                self.inner.lifecycle.context().cancel();
                return Err(err);
            }
        };
        let routes = registry.len();
        self.inner.lifecycle.set_awaited(awaited);
        if self.inner.registry.set(registry).is_err() {
            return Err(BuildError::AlreadyBuilt);
        }
        info!(subscribers, routes, "bus built");

        self.exec_command(&mut BusInitialized::default()).await;
        Ok(())
    }

    /// Builds, then runs until a termination trigger.
    pub async fn build_and_run(
        &self,
        providers: Vec<Provider>,
    ) -> Result<ShutdownReport, RuntimeError> {
        self.build(providers).await?;
        self.run().await
    }

    fn assemble(
        &self,
        providers: Vec<Provider>,
    ) -> Result<(Registry, Vec<StopSignal>, usize), BuildError> {
        let mut builder = RegistryBuilder::new();
        let stop: Arc<dyn Subscriber> = Arc::new(StopHandler {
            lifecycle: Arc::clone(&self.inner.lifecycle),
        });
        builder.register(BusStop::NAME, TypeId::of::<BusStop>(), &stop)?;

        let mut entries = Vec::with_capacity(providers.len());
        for provider in providers {
            let sub = provider.provide(self.context(), self.clone());
            let (order, stopped, supported) = sub.build_options().into_parts();
            debug!(
                subscriber = sub.name(),
                order,
                events = supported.len(),
                "subscriber constructed"
            );
            entries.push((sub, order, stopped, supported));
        }

        // stable: equal orders keep provider order
        entries.sort_by_key(|(_, order, _, _)| *order);

        let subscribers = entries.len();
        let mut awaited = Vec::new();
        for (sub, _, stopped, supported) in entries {
            for (name, type_id) in supported {
                builder.register(name, type_id, &sub)?;
            }
            if let Some(token) = stopped {
                awaited.push(StopSignal {
                    subscriber: sub.name(),
                    token,
                });
            }
        }

        Ok((builder.freeze(), awaited, subscribers))
    }

    // ---------------------------
    // Dispatch
    // ---------------------------

    /// Routes a query to the first subscriber registered for its name.
    ///
    /// Marks the query executed when a subscriber processed it. Before `build`
    /// has frozen the routing table every query is unrouted.
    pub async fn exec_query(&self, query: &mut dyn AnyQuery) -> QueryResult {
        let name = query.name();
        let Some(sub) = self.registry().and_then(|r| r.first(name)) else {
            trace!(event = %name, "query unrouted");
            return QueryResult::Unrouted;
        };

        trace!(event = %name, subscriber = sub.name(), "query routed");
        let answer = sub.process_query(query).await;
        query.set_executed();
        QueryResult::from(answer)
    }

    /// Routes a query and extracts its answer as `T`.
    pub async fn exec_query_as<T: Any, Q: Query>(&self, query: &mut Q) -> Result<T, QueryError> {
        self.exec_query(query).await.extract::<T>(Q::NAME)
    }

    /// Routes a command to every subscriber registered for its name, in order,
    /// until one of them stops propagation.
    pub async fn exec_command(&self, command: &mut dyn AnyCommand) {
        let name = command.name();
        let Some(registry) = self.registry() else {
            trace!(event = %name, "command dropped; bus not built");
            return;
        };

        for sub in registry.lookup(name) {
            trace!(event = %name, subscriber = sub.name(), "command routed");
            sub.process_command(command).await;
            if command.is_stop_propagation() {
                debug!(event = %name, subscriber = sub.name(), "command propagation stopped");
                break;
            }
        }
    }

    /// Routes every query concurrently, one task per query.
    ///
    /// Blocks until all of them completed and hands every query back next to its
    /// result, in input order, so state the handler wrote into a query (such as
    /// the executed flag) stays visible. If a handler panics, the remaining
    /// queries still run to completion and the panic is then resumed on the caller.
    pub async fn exec_multi_query(
        &self,
        queries: Vec<Box<dyn AnyQuery>>,
    ) -> Vec<(Box<dyn AnyQuery>, QueryResult)> {
        if queries.is_empty() {
            return Vec::new();
        }

        let count = queries.len();
        let mut set = JoinSet::new();
        for (idx, mut query) in queries.into_iter().enumerate() {
            let bus = self.clone();
            let limit = self.inner.query_limit.clone();
            set.spawn(async move {
                let _permit = match limit {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                let result = bus.exec_query(query.as_mut()).await;
                (idx, query, result)
            });
        }

        let mut slots: Vec<Option<(Box<dyn AnyQuery>, QueryResult)>> =
            (0..count).map(|_| None).collect();
        let mut failure: Option<Box<dyn Any + Send>> = None;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, query, result)) => slots[idx] = Some((query, result)),
                Err(err) => {
                    if failure.is_some() {
                        continue;
                    }
                    failure = Some(if err.is_panic() {
                        err.into_panic()
                    } else {
                        warn!(error = %err, "multi-query unit cancelled");
                        Box::new(err.to_string())
                    });
                }
            }
        }

        if let Some(payload) = failure {
            std::panic::resume_unwind(payload);
        }

        slots.into_iter().flatten().collect()
    }

    // ---------------------------
    // Lifecycle
    // ---------------------------

    /// Runs until an OS termination signal, the stop command or the parent
    /// context, then shuts down gracefully.
    pub async fn run(&self) -> Result<ShutdownReport, RuntimeError> {
        self.run_until(shutdown::os_signal()).await
    }

    /// Runs until `trigger` completes, the stop command or the parent context,
    /// then shuts down gracefully.
    ///
    /// Entering after shutdown started just waits for it and returns its report.
    pub async fn run_until<F>(&self, trigger: F) -> Result<ShutdownReport, RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let lifecycle = &self.inner.lifecycle;
        match lifecycle.enter_running() {
            Ok(()) => info!(routes = self.route_count(), "bus running"),
            Err(BusState::Running) => return Err(RuntimeError::AlreadyRunning),
            Err(state) => debug!(?state, "run entered after shutdown started"),
        }

        tokio::select! {
            _ = trigger => debug!("external stop trigger fired"),
            _ = lifecycle.context().cancelled() => debug!("bus context cancelled"),
        }

        let report = lifecycle.shutdown().await;
        info!(clean = report.is_clean(), "bus stopped");
        Ok(report)
    }

    /// Routes the internal stop command.
    ///
    /// Returns after the shutdown it started (or joined) has completed. A bus
    /// that was never built has no route for the command and ignores it.
    pub async fn stop(&self) {
        self.exec_command(&mut BusStop::default()).await;
    }

    /// Waits until shutdown has completed.
    pub async fn stopped(&self) {
        self.inner.lifecycle.released().await;
    }
}

/// The bus's own subscriber for [`BusStop`].
struct StopHandler {
    lifecycle: Arc<Lifecycle>,
}

#[async_trait]
impl Subscriber for StopHandler {
    async fn process_command(&self, command: &mut dyn AnyCommand) {
        if command.is::<BusStop>() {
            let report = self.lifecycle.shutdown().await;
            debug!(clean = report.is_clean(), "stop command handled");
        }
    }

    fn build_options(&self) -> SubscriberOptions {
        SubscriberOptions::new().supports::<BusStop>()
    }

    fn name(&self) -> &'static str {
        "application-bus"
    }
}
