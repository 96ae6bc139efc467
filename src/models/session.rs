use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::instrument::Instrument;
use crate::websocket::ClientChannel;

/// Identifies one live connection, minted by the transport on connect
pub type ConnectionId = Uuid;

/// Server-side state for one live client connection
///
/// Starts unauthenticated with no subscriptions. `login` attaches the
/// identity. The registry only adds instruments to logged-in sessions.
pub struct ClientSession {
    identity: Option<String>,
    subscriptions: HashSet<Instrument>,
    channel: Arc<dyn ClientChannel>,
    pub connected_at: DateTime<Utc>,
}

impl ClientSession {
    pub fn new(channel: Arc<dyn ClientChannel>) -> Self {
        Self {
            identity: None,
            subscriptions: HashSet::new(),
            channel,
            connected_at: Utc::now(),
        }
    }

    /// Attach an identity; a repeated login starts over with no subscriptions
    pub fn login(&mut self, identity: String) {
        self.identity = Some(identity);
        self.subscriptions.clear();
    }

    /// Add an instrument; already held instruments are kept once
    pub fn subscribe(&mut self, instrument: Instrument) {
        self.subscriptions.insert(instrument);
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn subscriptions(&self) -> &HashSet<Instrument> {
        &self.subscriptions
    }

    pub fn is_subscribed(&self, instrument: &Instrument) -> bool {
        self.subscriptions.contains(instrument)
    }

    pub fn channel(&self) -> &Arc<dyn ClientChannel> {
        &self.channel
    }
}

impl fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSession")
            .field("identity", &self.identity)
            .field("subscriptions", &self.subscriptions)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}
