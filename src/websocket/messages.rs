use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::simulator::PriceSnapshot;
use crate::models::Instrument;
use crate::utils::rounding::{format_price, round_to_f64};

/// Messages pushed from the server to a client
///
/// Serialized as `{"event": "<name>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Reply to a successful login, carries the instrument catalog
    LoginSuccess(LoginSuccess),
    /// Acknowledges a successful subscribe
    Subscribed(String),
    /// Prices and histories for the client's subscriptions
    PriceUpdate(PriceUpdate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSuccess {
    pub supported_instruments: Vec<String>,
}

/// Delta payload for one client
///
/// `prices` holds strings with exactly two decimals, `histories` the same
/// values as numbers, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub prices: BTreeMap<String, String>,
    pub histories: BTreeMap<String, Vec<f64>>,
}

impl PriceUpdate {
    /// Add one instrument, rounding at this boundary only
    pub fn insert(&mut self, instrument: Instrument, snapshot: &PriceSnapshot) {
        let symbol = instrument.symbol().to_string();
        self.prices
            .insert(symbol.clone(), format_price(snapshot.current));
        self.histories.insert(
            symbol,
            snapshot.history.iter().map(|p| round_to_f64(*p)).collect(),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }
}

/// Requests sent by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Opaque identity, not verified
    Login(String),
    /// Symbol to add to the subscription set
    Subscribe(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_client_messages() {
        let login: ClientMessage =
            serde_json::from_str(r#"{"event":"login","data":"alice@example.com"}"#).unwrap();
        assert_eq!(login, ClientMessage::Login("alice@example.com".to_string()));

        let subscribe: ClientMessage =
            serde_json::from_str(r#"{"event":"subscribe","data":"GOOG"}"#).unwrap();
        assert_eq!(subscribe, ClientMessage::Subscribe("GOOG".to_string()));
    }

    #[test]
    fn test_unknown_client_event_is_rejected() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"event":"unsubscribe","data":"GOOG"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_login_success_wire_format() {
        let msg = ServerMessage::LoginSuccess(LoginSuccess {
            supported_instruments: vec!["GOOG".to_string(), "TSLA".to_string()],
        });
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"event": "loginSuccess", "data": {"supportedInstruments": ["GOOG", "TSLA"]}})
        );
    }

    #[test]
    fn test_subscribed_wire_format() {
        let msg = ServerMessage::Subscribed("NVDA".to_string());
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"event": "subscribed", "data": "NVDA"})
        );
    }

    #[test]
    fn test_price_update_rounds_at_serialization() {
        let mut update = PriceUpdate::default();
        let snapshot = PriceSnapshot {
            current: 201.126,
            history: vec![200.0, 199.994, 201.126],
        };
        update.insert(Instrument::parse("AMZN").unwrap(), &snapshot);

        let msg = ServerMessage::PriceUpdate(update);
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "event": "priceUpdate",
                "data": {
                    "prices": {"AMZN": "201.13"},
                    "histories": {"AMZN": [200.0, 199.99, 201.13]}
                }
            })
        );
    }
}
