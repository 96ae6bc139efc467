use parking_lot::RwLock;
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;

use super::registry::SubscriptionRegistry;
use super::simulator::{MarketSnapshot, PriceSimulator};
use crate::models::ClientSession;
use crate::websocket::{PriceUpdate, ServerMessage};

/// Default pause between two ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of one fan-out pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TickReport {
    /// Simulator tick the payloads were built from
    pub tick: u64,
    /// Sessions that were sent a price update
    pub delivered: usize,
    /// Sessions skipped: not logged in, nothing subscribed, or gone mid-tick
    pub skipped: usize,
    /// Sessions whose channel refused the message or panicked
    pub failed: usize,
}

/// Drives the simulator and pushes filtered updates to every session
///
/// A tick advances prices under the simulator's write lock, then fans out
/// from an owned [`MarketSnapshot`], so every client in one tick sees the
/// same price level.
pub struct BroadcastEngine {
    simulator: Arc<RwLock<PriceSimulator>>,
    registry: SubscriptionRegistry,
    tick_interval: Duration,
    /// Total price updates handed to channels (lifetime)
    total_delivered: AtomicU64,
    /// Total failed sends (lifetime)
    total_failed: AtomicU64,
}

impl BroadcastEngine {
    pub fn new(
        simulator: Arc<RwLock<PriceSimulator>>,
        registry: SubscriptionRegistry,
        tick_interval: Duration,
    ) -> Self {
        Self {
            simulator,
            registry,
            tick_interval,
            total_delivered: AtomicU64::new(0),
            total_failed: AtomicU64::new(0),
        }
    }

    /// One full tick: advance prices, then fan out
    pub fn tick(&self) -> TickReport {
        let market = self.advance();
        self.fan_out(&market)
    }

    /// Advance the simulator and capture the new price level
    pub fn advance(&self) -> MarketSnapshot {
        let mut simulator = self.simulator.write();
        simulator.tick();
        simulator.market_snapshot()
    }

    /// Send each subscribed session the prices it asked for
    ///
    /// Iterates over a snapshot of the connection ids taken up front; a
    /// session that disconnects in the meantime is skipped. A failed send,
    /// or a panic while serving one session, only affects that session.
    pub fn fan_out(&self, market: &MarketSnapshot) -> TickReport {
        let mut report = TickReport {
            tick: market.tick,
            ..TickReport::default()
        };

        for connection_id in self.registry.session_ids() {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                self.registry
                    .with_session(connection_id, |session| deliver(session, market))
            }));

            match outcome {
                Ok(Some(Delivery::Sent)) => report.delivered += 1,
                Ok(Some(Delivery::Nothing)) => report.skipped += 1,
                Ok(Some(Delivery::Failed)) => {
                    report.failed += 1;
                    warn!(
                        "Price update for {} dropped: channel closed",
                        connection_id
                    );
                }
                Err(_) => {
                    report.failed += 1;
                    error!(
                        "Price update for {} aborted: panic during delivery",
                        connection_id
                    );
                }
                Ok(None) => {
                    report.skipped += 1;
                    debug!("Session {} disconnected during tick {}", connection_id, market.tick);
                }
            }
        }

        self.total_delivered
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.total_failed
            .fetch_add(report.failed as u64, Ordering::Relaxed);

        report
    }

    /// Spawn the periodic tick loop on the tokio runtime
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately
            ticker.tick().await;

            info!("📈 Broadcast loop started (every {:?})", self.tick_interval);

            loop {
                ticker.tick().await;
                let report = self.tick();
                debug!(
                    tick = report.tick,
                    delivered = report.delivered,
                    skipped = report.skipped,
                    failed = report.failed,
                    "Tick broadcast"
                );
            }
        })
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn total_delivered(&self) -> u64 {
        self.total_delivered.load(Ordering::Relaxed)
    }

    pub fn total_failed(&self) -> u64 {
        self.total_failed.load(Ordering::Relaxed)
    }
}

enum Delivery {
    Sent,
    Nothing,
    Failed,
}

/// Build and send one session's delta payload
fn deliver(session: &ClientSession, market: &MarketSnapshot) -> Delivery {
    if !session.is_authenticated() || session.subscriptions().is_empty() {
        return Delivery::Nothing;
    }

    let mut update = PriceUpdate::default();
    for instrument in session.subscriptions() {
        if let Some(snapshot) = market.get(instrument) {
            update.insert(*instrument, snapshot);
        }
    }

    if update.is_empty() {
        return Delivery::Nothing;
    }

    if session.channel().send(ServerMessage::PriceUpdate(update)) {
        Delivery::Sent
    } else {
        Delivery::Failed
    }
}
