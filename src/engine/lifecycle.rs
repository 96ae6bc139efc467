use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::errors::FeedError;
use super::registry::SubscriptionRegistry;
use super::simulator::PriceSimulator;
use crate::models::{ClientSession, ConnectionId, Instrument};
use crate::websocket::{ClientChannel, ClientMessage, LoginSuccess, PriceUpdate, ServerMessage};

/// Entry points for connection events
///
/// Mutates the registry and answers the requesting connection right away,
/// outside the tick cycle.
#[derive(Clone)]
pub struct ConnectionLifecycle {
    registry: SubscriptionRegistry,
    simulator: Arc<RwLock<PriceSimulator>>,
}

impl ConnectionLifecycle {
    pub fn new(registry: SubscriptionRegistry, simulator: Arc<RwLock<PriceSimulator>>) -> Self {
        Self {
            registry,
            simulator,
        }
    }

    /// Open a session for a new connection
    pub fn connect(&self, channel: Arc<dyn ClientChannel>) -> ConnectionId {
        let connection_id = Uuid::new_v4();
        self.registry.create_session(connection_id, channel);
        info!("Client connected: {}", connection_id);
        connection_id
    }

    /// Log in and reply with the instrument catalog
    pub fn login(&self, connection_id: ConnectionId, identity: String) -> Result<(), FeedError> {
        let supported_instruments = self.registry.login(connection_id, identity)?;
        info!("Client {} logged in", connection_id);

        self.registry.send_to(
            connection_id,
            ServerMessage::LoginSuccess(LoginSuccess {
                supported_instruments,
            }),
        )
    }

    /// Subscribe, then immediately send the acknowledgment and the current
    /// price of just that instrument
    ///
    /// The simulator read lock is held until both replies are queued, so no
    /// tick can advance prices in between. The session entry is held as
    /// well, so the tick's fan-out reaches this client after the replies.
    pub fn subscribe(
        &self,
        connection_id: ConnectionId,
        symbol: &str,
    ) -> Result<Instrument, FeedError> {
        let simulator = self.simulator.read();

        let instrument = self
            .registry
            .subscribe_with(connection_id, symbol, |session, instrument| {
                reply(
                    session,
                    connection_id,
                    ServerMessage::Subscribed(instrument.symbol().to_string()),
                )?;

                if let Some(snapshot) = simulator.snapshot(&instrument) {
                    let mut update = PriceUpdate::default();
                    update.insert(instrument, &snapshot);
                    reply(session, connection_id, ServerMessage::PriceUpdate(update))?;
                }
                Ok(())
            })?;

        debug!("Client {} subscribed to {}", connection_id, instrument);
        Ok(instrument)
    }

    /// Tear down the session. Safe to call at any time, more than once.
    pub fn disconnect(&self, connection_id: ConnectionId) {
        if self.registry.remove_session(connection_id) {
            info!("Client disconnected: {}", connection_id);
        }
    }

    /// Dispatch a decoded client request
    ///
    /// Rejected requests are not reported to the client: the missing
    /// acknowledgment is the only signal.
    pub fn handle(&self, connection_id: ConnectionId, message: ClientMessage) {
        let result = match message {
            ClientMessage::Login(identity) => self.login(connection_id, identity),
            ClientMessage::Subscribe(symbol) => self.subscribe(connection_id, &symbol).map(|_| ()),
        };

        if let Err(e) = result {
            if e.is_delivery_failure() {
                warn!("Reply to {} not delivered: {}", connection_id, e);
            } else {
                debug!("Request from {} ignored: {}", connection_id, e);
            }
        }
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }
}

fn reply(
    session: &ClientSession,
    connection_id: ConnectionId,
    message: ServerMessage,
) -> Result<(), FeedError> {
    if session.channel().send(message) {
        Ok(())
    } else {
        Err(FeedError::ChannelClosed(connection_id))
    }
}
