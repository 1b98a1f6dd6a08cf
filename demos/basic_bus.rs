//! # Example: basic_bus
//!
//! Demonstrates the full bus lifecycle.
//!
//! Shows how to:
//! - Declare queries and commands with compile-time names.
//! - Resolve a peer at initialization time with an ordinary query.
//! - Run a background subscriber that reports when it has stopped.
//! - Fan out a batch of queries with [`ApplicationBus::exec_multi_query`].
//!
//! ## Flow
//! ```text
//! build([greeter(order 10), settings(order 0), ticker])
//!     ├─► BusInitialized → settings, then greeter (queries GetSetting)
//!     ├─► exec_query / exec_multi_query
//!     └─► run() ──► stop command after 1s (or Ctrl-C)
//!                     └─► ctx cancelled → ticker stops → ShutdownReport
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example basic_bus
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dibus::{
    answer, event_name, provider, AnyCommand, AnyQuery, ApplicationBus, BusConfig,
    BusInitialized, Event, EventName, Payload, Query, QueryState, Subscriber, SubscriberOptions,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct GetSetting {
    state: QueryState,
    key: &'static str,
}

impl Event for GetSetting {
    const NAME: EventName = event_name!(GetSetting);
}

impl Query for GetSetting {
    fn query_state(&self) -> &QueryState {
        &self.state
    }
    fn query_state_mut(&mut self) -> &mut QueryState {
        &mut self.state
    }
}

#[derive(Default)]
struct Greet {
    state: QueryState,
    who: &'static str,
}

impl Event for Greet {
    const NAME: EventName = event_name!(Greet);
}

impl Query for Greet {
    fn query_state(&self) -> &QueryState {
        &self.state
    }
    fn query_state_mut(&mut self) -> &mut QueryState {
        &mut self.state
    }
}

/// Static key/value settings.
struct Settings {
    values: HashMap<&'static str, String>,
}

#[async_trait]
impl Subscriber for Settings {
    async fn process_query(&self, query: &mut dyn AnyQuery) -> Option<Payload> {
        let key = query.downcast_ref::<GetSetting>()?.key;
        self.values.get(key).cloned().and_then(answer)
    }

    fn build_options(&self) -> SubscriberOptions {
        SubscriberOptions::new()
            .with_order(0)
            .supports::<GetSetting>()
    }

    fn name(&self) -> &'static str {
        "settings"
    }
}

/// Builds greetings with a salutation resolved from [`Settings`] at init.
struct Greeter {
    bus: ApplicationBus,
    salutation: Mutex<String>,
}

#[async_trait]
impl Subscriber for Greeter {
    async fn process_query(&self, query: &mut dyn AnyQuery) -> Option<Payload> {
        let who = query.downcast_ref::<Greet>()?.who;
        let salutation = self.salutation.lock().ok()?.clone();
        answer(format!("{salutation}, {who}!"))
    }

    async fn process_command(&self, command: &mut dyn AnyCommand) {
        if !command.is::<BusInitialized>() {
            return;
        }
        let mut query = GetSetting {
            key: "salutation",
            ..Default::default()
        };
        match self.bus.exec_query_as::<String, _>(&mut query).await {
            Ok(value) => {
                if let Ok(mut s) = self.salutation.lock() {
                    *s = value;
                }
            }
            Err(err) => tracing::warn!(error = %err, "salutation unresolved"),
        }
    }

    fn build_options(&self) -> SubscriberOptions {
        SubscriberOptions::new()
            .with_order(10)
            .supports::<Greet>()
            .supports::<BusInitialized>()
    }

    fn name(&self) -> &'static str {
        "greeter"
    }
}

/// Background loop that winds down when the bus context is cancelled.
struct Ticker {
    stopped: CancellationToken,
}

impl Ticker {
    fn spawn(ctx: CancellationToken) -> Arc<Self> {
        let stopped = CancellationToken::new();
        let done = stopped.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_millis(250));
            loop {
                tokio::select! {
                    _ = ctx.cancelled() => break,
                    _ = tick.tick() => tracing::debug!("tick"),
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
            println!("[ticker] stopped");
            done.cancel();
        });
        Arc::new(Self { stopped })
    }
}

impl Subscriber for Ticker {
    fn build_options(&self) -> SubscriberOptions {
        SubscriberOptions::new().with_stopped_signal(self.stopped.clone())
    }

    fn name(&self) -> &'static str {
        "ticker"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bus = ApplicationBus::new(BusConfig::with_grace(Duration::from_secs(2)));
    bus.build(vec![
        provider(|_ctx, bus| {
            Arc::new(Greeter {
                bus,
                salutation: Mutex::new("Hi".into()),
            })
        }),
        provider(|_ctx, _bus| {
            Arc::new(Settings {
                values: HashMap::from([("salutation", "Hello".to_string())]),
            })
        }),
        provider(|ctx, _bus| Ticker::spawn(ctx)),
    ])
    .await?;

    let greeting = bus
        .exec_query_as::<String, _>(&mut Greet {
            who: "world",
            ..Default::default()
        })
        .await?;
    println!("[query] {greeting}");

    let batch = bus
        .exec_multi_query(vec![
            Box::new(Greet {
                who: "alice",
                ..Default::default()
            }) as Box<dyn AnyQuery>,
            Box::new(GetSetting {
                key: "missing",
                ..Default::default()
            }),
            Box::new(Greet {
                who: "bob",
                ..Default::default()
            }),
        ])
        .await;
    for (idx, (query, result)) in batch.iter().enumerate() {
        println!(
            "[multi] #{idx} {} (executed: {}): {:?}",
            query.name(),
            query.is_executed(),
            result.downcast_ref::<String>()
        );
    }

    let stopper = bus.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        stopper.stop().await;
    });

    let report = bus.run().await?;
    println!("[bus] stopped: {:?}", report.outcome);
    Ok(())
}
