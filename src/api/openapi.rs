use utoipa::OpenApi;

use crate::api::handlers;
use crate::api::responses::*;
use crate::engine::{FeedStats, TickReport};

/// OpenAPI specification
///
/// The WebSocket feed at `/ws` is not described here: frames are
/// `{"event": ..., "data": ...}` JSON, see `websocket::messages`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Price Feed API",
        version = "1.0.0",
        description = "Simulated market data feed with per-client subscriptions over WebSocket",
        license(
            name = "MIT"
        )
    ),
    paths(
        handlers::liveness,
        handlers::health_check,
        handlers::get_stats,
        handlers::list_instruments,
        handlers::get_instrument,
    ),
    components(
        schemas(
            HealthResponse,
            InstrumentQuote,
            InstrumentListResponse,
            FeedStats,
            TickReport,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Feed", description = "Simulated market data endpoints"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/health",
            "/api/v1/stats",
            "/api/v1/instruments",
            "/api/v1/instruments/{symbol}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
