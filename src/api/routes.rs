//! HTTP API route definitions.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{
    close_sweepstake, create_sweepstake, get_sweepstake, health, list_sweepstakes, ready,
    refresh_sweepstake_handler, AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Sweepstake endpoints
        .route(
            "/api/v1/sweepstakes",
            post(create_sweepstake).get(list_sweepstakes),
        )
        .route("/api/v1/sweepstakes/:id", get(get_sweepstake))
        .route(
            "/api/v1/sweepstakes/:id/refresh",
            post(refresh_sweepstake_handler),
        )
        .route("/api/v1/sweepstakes/:id/close", post(close_sweepstake))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::mock::{mock_market, MockProvider, SelectionBuilder};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state_with_market() -> AppState {
        let provider = MockProvider::new();
        provider.set_market(mock_market(
            "1.234",
            "Tournament Winner",
            vec![
                SelectionBuilder::new(1, "A")
                    .back(dec!(2.0), dec!(100))
                    .lay(dec!(2.2), dec!(100))
                    .build(),
                SelectionBuilder::new(2, "B")
                    .back(dec!(4.0), dec!(100))
                    .lay(dec!(4.4), dec!(100))
                    .build(),
                SelectionBuilder::new(3, "C")
                    .back(dec!(8.0), dec!(100))
                    .lay(dec!(9.0), dec!(100))
                    .build(),
            ],
        ));
        AppState::new(Arc::new(provider))
    }

    fn create_body() -> Body {
        Body::from(
            json!({
                "name": "Office Sweep",
                "market_id": "1.234",
                "method": "staggered",
                "participants": ["Alice", "Bob"],
            })
            .to_string(),
        )
    }

    async fn post_json(app: Router, uri: &str, body: Body) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = create_router(state_with_market());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_endpoint_tracks_state() {
        let state = state_with_market();
        state.set_ready(true);
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_endpoint_returns_503_when_not_ready() {
        let app = create_router(state_with_market());

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let state = state_with_market();

        let response =
            post_json(create_router(state.clone()), "/api/v1/sweepstakes", create_body()).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let view: crate::api::handlers::SweepstakeView = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(view.id, "swp-000001");
        assert_eq!(view.num_selections, 3);

        let response = create_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/sweepstakes/swp-000001")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let body = Body::from(
            json!({
                "name": "Office Sweep",
                "market_id": "1.234",
                "method": "alphabetical",
                "participants": ["Alice", "Bob"],
            })
            .to_string(),
        );

        let response = post_json(create_router(state_with_market()), "/api/v1/sweepstakes", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_sweepstake_is_404() {
        let response = create_router(state_with_market())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/sweepstakes/swp-000042")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn refresh_of_closed_sweepstake_conflicts() {
        let state = state_with_market();

        let response =
            post_json(create_router(state.clone()), "/api/v1/sweepstakes", create_body()).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = post_json(
            create_router(state.clone()),
            "/api/v1/sweepstakes/swp-000001/close",
            Body::empty(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = post_json(
            create_router(state),
            "/api/v1/sweepstakes/swp-000001/refresh",
            Body::empty(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
