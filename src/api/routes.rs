use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::engine::FeedState;
use crate::websocket::websocket_handler;

use super::handlers::*;
use super::openapi::ApiDoc;

/// Create the API router with Swagger UI, WebSocket feed and static assets
///
/// Any path not matched by a route is looked up in `static_dir`.
pub fn create_router(state: FeedState, static_dir: &str) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // WebSocket endpoint
        .route("/ws", get(websocket_handler))
        // Health endpoints
        .route("/", get(liveness))
        .route("/health", get(health_check))
        // Feed endpoints
        .route("/api/v1/stats", get(get_stats))
        .route("/api/v1/instruments", get(list_instruments))
        .route("/api/v1/instruments/:symbol", get(get_instrument))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::responses::{InstrumentListResponse, InstrumentQuote};
    use crate::engine::PriceSimulator;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    fn state() -> FeedState {
        FeedState::new(PriceSimulator::with_seed(10), Duration::from_secs(1))
    }

    async fn get_body(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_liveness() {
        let (status, body) = get_body(create_router(state(), "public"), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("running"));
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_body(create_router(state(), "public"), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_stats() {
        let state = state();
        state.broadcaster.tick();
        let (status, body) = get_body(create_router(state, "public"), "/api/v1/stats").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["ticks"], 1);
        assert_eq!(json["sessions"], 0);
        assert_eq!(json["tick_interval_ms"], 1000);
        assert_eq!(json["supported_instruments"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn test_list_instruments() {
        let (status, body) =
            get_body(create_router(state(), "public"), "/api/v1/instruments").await;
        assert_eq!(status, StatusCode::OK);
        let list: InstrumentListResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(list.tick, 0);
        let symbols: Vec<&str> = list.instruments.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["GOOG", "TSLA", "AMZN", "META", "NVDA"]);
        assert!(list.instruments.iter().all(|q| q.history.len() == 1));
    }

    #[tokio::test]
    async fn test_get_instrument() {
        let (status, body) =
            get_body(create_router(state(), "public"), "/api/v1/instruments/META").await;
        assert_eq!(status, StatusCode::OK);
        let quote: InstrumentQuote = serde_json::from_slice(&body).unwrap();
        assert_eq!(quote.symbol, "META");
        assert_eq!(quote.price.split('.').nth(1).map(str::len), Some(2));
    }

    #[tokio::test]
    async fn test_get_unknown_instrument() {
        let (status, body) =
            get_body(create_router(state(), "public"), "/api/v1/instruments/AAPL").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Invalid instrument: AAPL");
    }

    #[tokio::test]
    async fn test_serves_static_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log('feed');").unwrap();
        let static_dir = dir.path().to_str().unwrap();

        let (status, body) = get_body(create_router(state(), static_dir), "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"console.log('feed');");

        let (status, _) = get_body(create_router(state(), static_dir), "/missing.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
