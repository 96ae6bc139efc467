//! Price Feed Engine Module
//!
//! This module contains the core feed functionality:
//! - `errors` - Error types for registry and broadcast operations
//! - `history` - Fixed-capacity price history buffer
//! - `simulator` - Random-walk price generator
//! - `registry` - Per-connection sessions and subscriptions
//! - `broadcast` - Periodic tick and filtered fan-out
//! - `lifecycle` - Connect / login / subscribe / disconnect handling
//! - `state` - Shared container wiring the pieces together

pub mod broadcast;
pub mod errors;
pub mod history;
pub mod lifecycle;
pub mod registry;
pub mod simulator;
pub mod state;

// Re-export commonly used types for convenience
pub use broadcast::{BroadcastEngine, TickReport, DEFAULT_TICK_INTERVAL};
pub use errors::FeedError;
pub use history::{HistoryBuffer, HISTORY_CAPACITY};
pub use lifecycle::ConnectionLifecycle;
pub use registry::SubscriptionRegistry;
pub use simulator::{MarketSnapshot, PriceSimulator, PriceSnapshot};
pub use state::{FeedState, FeedStats};
