use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::engine::PriceSnapshot;
use crate::models::Instrument;
use crate::utils::rounding::{format_price, round_to_f64};

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Current price and rolling history of one instrument
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InstrumentQuote {
    #[schema(example = "GOOG")]
    pub symbol: String,
    /// Two decimal places, as in `priceUpdate`
    #[schema(example = "312.47")]
    pub price: String,
    /// Oldest first
    pub history: Vec<f64>,
}

impl InstrumentQuote {
    pub fn new(instrument: Instrument, snapshot: &PriceSnapshot) -> Self {
        Self {
            symbol: instrument.symbol().to_string(),
            price: format_price(snapshot.current),
            history: snapshot.history.iter().map(|p| round_to_f64(*p)).collect(),
        }
    }
}

/// Quotes for the whole catalog
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InstrumentListResponse {
    /// Simulator tick the quotes belong to
    pub tick: u64,
    pub instruments: Vec<InstrumentQuote>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
