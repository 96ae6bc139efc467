use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use utoipa::ToSchema;

use super::broadcast::BroadcastEngine;
use super::lifecycle::ConnectionLifecycle;
use super::registry::SubscriptionRegistry;
use super::simulator::PriceSimulator;
use crate::config::FeedConfig;
use crate::models::supported_symbols;

/// Statistics for the running feed
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedStats {
    /// Completed simulator ticks
    pub ticks: u64,
    /// Live connections, logged in or not
    pub sessions: usize,
    /// Connections that completed login
    pub authenticated_sessions: usize,
    /// Price updates handed to connections by the tick loop (lifetime)
    pub updates_delivered: u64,
    /// Tick sends that hit a closed connection (lifetime)
    pub updates_failed: u64,
    pub tick_interval_ms: u64,
    pub supported_instruments: Vec<String>,
    pub started_at: DateTime<Utc>,
}

/// Process-wide shared state, handed to the tick loop and every connection
///
/// Cloning shares the same simulator and registry.
#[derive(Clone)]
pub struct FeedState {
    pub simulator: Arc<RwLock<PriceSimulator>>,
    pub registry: SubscriptionRegistry,
    pub lifecycle: ConnectionLifecycle,
    pub broadcaster: Arc<BroadcastEngine>,
    pub started_at: DateTime<Utc>,
}

impl FeedState {
    pub fn new(simulator: PriceSimulator, tick_interval: Duration) -> Self {
        let simulator = Arc::new(RwLock::new(simulator));
        let registry = SubscriptionRegistry::new();
        let lifecycle = ConnectionLifecycle::new(registry.clone(), Arc::clone(&simulator));
        let broadcaster = Arc::new(BroadcastEngine::new(
            Arc::clone(&simulator),
            registry.clone(),
            tick_interval,
        ));

        Self {
            simulator,
            registry,
            lifecycle,
            broadcaster,
            started_at: Utc::now(),
        }
    }

    /// Build the state described by the configuration
    pub fn from_config(config: &FeedConfig) -> Self {
        let simulator = match config.price_seed {
            Some(seed) => PriceSimulator::with_seed(seed),
            None => PriceSimulator::new(),
        };
        Self::new(simulator, config.tick_interval())
    }

    /// Start the periodic broadcast loop
    pub fn start_broadcasting(&self) -> JoinHandle<()> {
        Arc::clone(&self.broadcaster).spawn()
    }

    pub fn stats(&self) -> FeedStats {
        let ticks = self.simulator.read().ticks();
        FeedStats {
            ticks,
            sessions: self.registry.len(),
            authenticated_sessions: self.registry.authenticated_count(),
            updates_delivered: self.broadcaster.total_delivered(),
            updates_failed: self.broadcaster.total_failed(),
            tick_interval_ms: self.broadcaster.tick_interval().as_millis() as u64,
            supported_instruments: supported_symbols(),
            started_at: self.started_at,
        }
    }
}
