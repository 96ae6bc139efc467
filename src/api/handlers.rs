use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::engine::{FeedError, FeedState, FeedStats};
use crate::models::Instrument;

use super::responses::*;

/// Convert FeedError to HTTP response
impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = match &self {
            FeedError::InvalidInstrument(_) => StatusCode::NOT_FOUND,
            FeedError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            FeedError::NotLoggedIn(_) => StatusCode::UNAUTHORIZED,
            FeedError::ChannelClosed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Backend is running", body = String)
    )
)]
pub async fn liveness() -> &'static str {
    "Price feed backend is running 🚀"
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    })
}

/// Feed statistics
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "Feed",
    responses(
        (status = 200, description = "Tick and session counters", body = FeedStats)
    )
)]
pub async fn get_stats(State(state): State<FeedState>) -> Json<FeedStats> {
    Json(state.stats())
}

/// Current quotes for every instrument
#[utoipa::path(
    get,
    path = "/api/v1/instruments",
    tag = "Feed",
    responses(
        (status = 200, description = "Quotes for the catalog", body = InstrumentListResponse)
    )
)]
pub async fn list_instruments(State(state): State<FeedState>) -> Json<InstrumentListResponse> {
    let market = state.simulator.read().market_snapshot();

    let instruments = Instrument::all()
        .filter_map(|instrument| {
            market
                .get(&instrument)
                .map(|snapshot| InstrumentQuote::new(instrument, snapshot))
        })
        .collect();

    Json(InstrumentListResponse {
        tick: market.tick,
        instruments,
    })
}

/// Current quote for one instrument
#[utoipa::path(
    get,
    path = "/api/v1/instruments/{symbol}",
    tag = "Feed",
    params(
        ("symbol" = String, Path, description = "Instrument symbol, e.g. GOOG")
    ),
    responses(
        (status = 200, description = "Quote found", body = InstrumentQuote),
        (status = 404, description = "Symbol not in the catalog", body = ErrorResponse)
    )
)]
pub async fn get_instrument(
    State(state): State<FeedState>,
    Path(symbol): Path<String>,
) -> Result<Json<InstrumentQuote>, FeedError> {
    let instrument = Instrument::parse(&symbol)?;
    let snapshot = state
        .simulator
        .read()
        .snapshot(&instrument)
        .ok_or(FeedError::InvalidInstrument(symbol))?;

    Ok(Json(InstrumentQuote::new(instrument, &snapshot)))
}
