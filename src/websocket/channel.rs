use tokio::sync::mpsc;

use super::messages::ServerMessage;

/// Outbound side of one client connection
///
/// Sends are fire-and-forget: implementations must not block and report
/// only whether the message could be handed to the connection.
pub trait ClientChannel: Send + Sync {
    /// Returns false if the connection is gone
    fn send(&self, message: ServerMessage) -> bool;
}

/// The WebSocket task drains the receiving end into the socket
impl ClientChannel for mpsc::UnboundedSender<ServerMessage> {
    fn send(&self, message: ServerMessage) -> bool {
        mpsc::UnboundedSender::send(self, message).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_sender_delivers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(ClientChannel::send(&tx, ServerMessage::Subscribed("GOOG".to_string())));
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::Subscribed("GOOG".to_string())
        );
    }

    #[test]
    fn test_send_after_receiver_dropped_fails() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        assert!(!ClientChannel::send(&tx, ServerMessage::Subscribed("GOOG".to_string())));
    }
}
