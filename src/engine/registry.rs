use dashmap::DashMap;
use std::sync::Arc;

use super::errors::FeedError;
use crate::models::{supported_symbols, ClientSession, ConnectionId, Instrument};
use crate::websocket::{ClientChannel, ServerMessage};

/// Live sessions keyed by connection id
///
/// Each session is mutated under its DashMap shard write guard, so a reader
/// sees a subscription set either before or after a change, never halfway.
/// Cloning is cheap and shares the same map.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    sessions: Arc<DashMap<ConnectionId, ClientSession>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new unauthenticated session. No-op if the id is taken.
    pub fn create_session(&self, connection_id: ConnectionId, channel: Arc<dyn ClientChannel>) {
        self.sessions
            .entry(connection_id)
            .or_insert_with(|| ClientSession::new(channel));
    }

    /// Attach an identity and reset subscriptions, returning the catalog
    pub fn login(
        &self,
        connection_id: ConnectionId,
        identity: String,
    ) -> Result<Vec<String>, FeedError> {
        let mut session = self
            .sessions
            .get_mut(&connection_id)
            .ok_or(FeedError::SessionNotFound(connection_id))?;
        session.login(identity);
        Ok(supported_symbols())
    }

    /// Add an instrument to a logged-in session's subscription set
    ///
    /// Leaves all state untouched on error.
    pub fn subscribe(
        &self,
        connection_id: ConnectionId,
        symbol: &str,
    ) -> Result<Instrument, FeedError> {
        self.subscribe_with(connection_id, symbol, |_, _| Ok(()))
    }

    /// Like [`SubscriptionRegistry::subscribe`], then runs `reply` before the
    /// session entry is released
    ///
    /// A concurrent fan-out cannot reach this session while `reply` runs, so
    /// whatever `reply` sends is ordered before the next tick's update.
    pub fn subscribe_with<F>(
        &self,
        connection_id: ConnectionId,
        symbol: &str,
        reply: F,
    ) -> Result<Instrument, FeedError>
    where
        F: FnOnce(&ClientSession, Instrument) -> Result<(), FeedError>,
    {
        let mut session = self
            .sessions
            .get_mut(&connection_id)
            .ok_or(FeedError::SessionNotFound(connection_id))?;
        if !session.is_authenticated() {
            return Err(FeedError::NotLoggedIn(connection_id));
        }
        let instrument = Instrument::parse(symbol)?;
        session.subscribe(instrument);
        reply(session.value(), instrument)?;
        Ok(instrument)
    }

    /// Drop a session. Returns whether one was present.
    pub fn remove_session(&self, connection_id: ConnectionId) -> bool {
        self.sessions.remove(&connection_id).is_some()
    }

    /// Deliver a message to one connection
    pub fn send_to(
        &self,
        connection_id: ConnectionId,
        message: ServerMessage,
    ) -> Result<(), FeedError> {
        let channel = self
            .sessions
            .get(&connection_id)
            .map(|session| Arc::clone(session.channel()))
            .ok_or(FeedError::SessionNotFound(connection_id))?;

        if channel.send(message) {
            Ok(())
        } else {
            Err(FeedError::ChannelClosed(connection_id))
        }
    }

    /// Visit every live session, in no particular order
    ///
    /// Holds a shard read lock while `f` runs: `f` must not call back into
    /// the registry.
    pub fn for_each_live_session<F>(&self, mut f: F)
    where
        F: FnMut(ConnectionId, &ClientSession),
    {
        for entry in self.sessions.iter() {
            f(*entry.key(), entry.value());
        }
    }

    /// Run `f` against one session if it still exists
    pub fn with_session<R>(
        &self,
        connection_id: ConnectionId,
        f: impl FnOnce(&ClientSession) -> R,
    ) -> Option<R> {
        self.sessions.get(&connection_id).map(|session| f(session.value()))
    }

    /// Point-in-time copy of the connection ids
    pub fn session_ids(&self) -> Vec<ConnectionId> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.sessions.contains_key(&connection_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of sessions that completed login
    pub fn authenticated_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.is_authenticated())
            .count()
    }
}
