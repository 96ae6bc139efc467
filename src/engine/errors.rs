//! Error types for the feed engine
//!
//! None of these are fatal. Rejections are swallowed by the connection
//! lifecycle (the remote client only notices the missing acknowledgment),
//! delivery failures are logged and confined to the session they hit.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the subscription registry and the broadcast path
///
/// # Error Categories
///
/// - **Rejections**: `NotLoggedIn`, `InvalidInstrument`
/// - **State Errors**: `SessionNotFound`
/// - **Delivery Errors**: `ChannelClosed`
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// No live session for this connection id
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// Subscribe arrived before login completed
    #[error("Session not logged in: {0}")]
    NotLoggedIn(Uuid),

    /// Symbol is not part of the instrument catalog
    #[error("Invalid instrument: {0}")]
    InvalidInstrument(String),

    /// The connection's outbound channel is gone
    #[error("Outbound channel closed for session: {0}")]
    ChannelClosed(Uuid),
}

impl FeedError {
    /// Returns true if a client request was refused without touching state
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FeedError::NotLoggedIn(_) | FeedError::InvalidInstrument(_)
        )
    }

    /// Returns true if the error came from sending to a connection
    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, FeedError::ChannelClosed(_))
    }
}
