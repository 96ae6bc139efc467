// Library Crate Root
// lib.rs

// main.rs and the benches import through lib.rs like an external crate
pub mod api;
pub mod config;
pub mod engine;
pub mod models;
pub mod utils;
pub mod websocket;

// pub use = re-export at crate root
pub use api::create_router;
pub use config::{ConfigError, FeedConfig};
pub use engine::{
    BroadcastEngine, ConnectionLifecycle, FeedError, FeedState, PriceSimulator,
    SubscriptionRegistry,
};
pub use models::{ClientSession, ConnectionId, Instrument};
pub use websocket::{ClientMessage, ServerMessage};
