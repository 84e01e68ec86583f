//! HTTP and WebSocket surface for gestura dashboards.

pub mod error;
pub mod realtime;
pub mod routes;
pub mod state;

use axum::Router;
use gestura_core::config::AppConfig;
use gestura_core::GestureHub;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

/// Build the axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let realtime_path = state.config.realtime.path.clone();
    let cors = state.config.server.cors;

    let mut app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::gesture_routes())
        .merge(routes::analytics_routes())
        .merge(realtime::realtime_routes(&realtime_path))
        .with_state(state);

    app = app.layer(TraceLayer::new_for_http());

    if cors {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

/// Start the HTTP server.
pub async fn serve(config: AppConfig, hub: Arc<GestureHub>) -> anyhow::Result<()> {
    config.validate()?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let realtime_path = config.realtime.path.clone();
    let router = build_router(AppState::new(config, hub));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Serving on http://{} (realtime at {})", addr, realtime_path);
    tracing::warn!("Gestures are kept in memory only and are lost on restart");
    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{DateTime, Utc};
    use gestura_core::types::RealtimeMessage;
    use futures::StreamExt;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_app(config: AppConfig) -> (Router, Arc<GestureHub>) {
        let hub = Arc::new(GestureHub::default());
        let router = build_router(AppState::new(config, hub.clone()));
        (router, hub)
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    /// Serve `app` on an ephemeral local port.
    async fn spawn_server(app: Router) -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    /// Poll `condition` until it holds, failing after a few seconds.
    async fn wait_until(condition: impl Fn() -> bool) {
        for _ in 0..300 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    fn alex() -> Value {
        json!({"studentName": "Alex", "gestureType": "wave", "message": "Needs Help"})
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _hub) = test_app(AppConfig::default());
        let resp = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_submit_returns_created_and_pushes() {
        let (app, hub) = test_app(AppConfig::default());
        let mut dashboard = hub.broadcaster().register();
        let requested_at = Utc::now();

        let resp = app.oneshot(post_json("/api/gestures", alex())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = body_json(resp).await;
        assert_eq!(body["studentName"], "Alex");
        assert_eq!(body["gestureType"], "wave");
        assert_eq!(body["message"], "Needs Help");
        assert!(!body["id"].as_str().unwrap().is_empty());
        let ts: DateTime<Utc> = body["timestamp"].as_str().unwrap().parse().unwrap();
        assert!(ts >= requested_at);

        let frame = dashboard.try_recv().expect("dashboard should receive the gesture");
        let pushed: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(pushed["type"], "gesture");
        assert_eq!(pushed["data"], body);

        let RealtimeMessage::Gesture(g) = serde_json::from_str::<RealtimeMessage>(&frame).unwrap();
        assert_eq!(hub.store().get_by_id(&g.id), Some(g));
    }

    #[tokio::test]
    async fn test_submit_invalid_names_fields() {
        let (app, hub) = test_app(AppConfig::default());
        let mut dashboard = hub.broadcaster().register();

        let resp = app
            .oneshot(post_json(
                "/api/gestures",
                json!({"studentName": "", "gestureType": "jump"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = body_json(resp).await;
        assert_eq!(body["error"], "Invalid gesture data");
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["studentName", "gestureType", "message"]);

        assert!(hub.store().is_empty());
        assert!(dashboard.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_submit_malformed_json() {
        let (app, hub) = test_app(AppConfig::default());
        let req = Request::builder()
            .method("POST")
            .uri("/api/gestures")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["details"][0]["field"], "body");
        assert!(hub.store().is_empty());
    }

    #[tokio::test]
    async fn test_today_lists_submitted() {
        let (app, _hub) = test_app(AppConfig::default());

        let resp = app.clone().oneshot(get("/api/gestures/today")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!([]));

        app.clone()
            .oneshot(post_json("/api/gestures", alex()))
            .await
            .unwrap();

        let resp = app.oneshot(get("/api/gestures/today")).await.unwrap();
        let body = body_json(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["studentName"], "Alex");
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let (app, _hub) = test_app(AppConfig::default());
        let created = body_json(
            app.clone()
                .oneshot(post_json("/api/gestures", alex()))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let resp = app
            .clone()
            .oneshot(get(&format!("/api/gestures/{id}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, created);

        let resp = app.oneshot(get("/api/gestures/nope")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["error"], "Gesture not found");
    }

    #[tokio::test]
    async fn test_analytics_view() {
        let (app, _hub) = test_app(AppConfig::default());

        let body = body_json(app.clone().oneshot(get("/api/analytics")).await.unwrap()).await;
        assert_eq!(body["totalToday"], 0);
        assert_eq!(body["recognizedCount"], 0);
        assert_eq!(body["percentageChange"], 0);
        assert_eq!(body["weeklyData"].as_array().unwrap().len(), 7);

        for _ in 0..2 {
            app.clone()
                .oneshot(post_json("/api/gestures", alex()))
                .await
                .unwrap();
        }

        let body = body_json(app.oneshot(get("/api/analytics")).await.unwrap()).await;
        assert_eq!(body["totalToday"], 2);
        assert_eq!(body["recognizedCount"], 2);
        assert_eq!(body["percentageChange"], 100);
        assert_eq!(body["weeklyData"][6]["count"], 2);
        assert!(body["summary"]
            .as_str()
            .unwrap()
            .starts_with("Alex tried to communicate 2 times today"));
    }

    #[tokio::test]
    async fn test_detect() {
        let (app, _hub) = test_app(AppConfig::default());

        let resp = app
            .clone()
            .oneshot(post_json("/api/gestures/detect", json!({"x": 20.0, "y": 1.0, "z": 0.5})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            json!({"gestureType": "shake", "message": "Ready to Answer"})
        );

        let resp = app
            .oneshot(post_json("/api/gestures/detect", json!({"x": 1.0, "y": 1.0, "z": 1.0})))
            .await
            .unwrap();
        assert_eq!(
            body_json(resp).await,
            json!({"gestureType": null, "message": null})
        );
    }

    #[tokio::test]
    async fn test_realtime_path_is_routed() {
        let mut config = AppConfig::default();
        config.realtime.path = "/live".into();
        let (app, _hub) = test_app(config);

        // A plain GET is not a valid upgrade, but the route must exist.
        let resp = app.clone().oneshot(get("/live")).await.unwrap();
        assert_ne!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app.oneshot(get("/ws")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_websocket_push_and_close() {
        let mut config = AppConfig::default();
        config.realtime.path = "/live".into();
        let (app, hub) = test_app(config);
        let addr = spawn_server(app.clone()).await;

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/live"))
            .await
            .unwrap();
        wait_until(|| hub.broadcaster().connection_count() == 1).await;

        let resp = app.oneshot(post_json("/api/gestures", alex())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;

        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("push should arrive")
            .unwrap()
            .unwrap();
        let pushed: Value = serde_json::from_str(msg.to_text().unwrap()).unwrap();
        assert_eq!(pushed["type"], "gesture");
        assert_eq!(pushed["data"]["studentName"], "Alex");
        assert_eq!(pushed["data"]["gestureType"], "wave");
        assert_eq!(pushed["data"], created);

        socket.close(None).await.unwrap();
        wait_until(|| hub.broadcaster().connection_count() == 0).await;
    }

    #[tokio::test]
    async fn test_websocket_dropped_client_is_unregistered() {
        let (app, hub) = test_app(AppConfig::default());
        let addr = spawn_server(app).await;

        let (first, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
            .await
            .unwrap();
        let (mut second, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
            .await
            .unwrap();
        wait_until(|| hub.broadcaster().connection_count() == 2).await;

        // Drop without a close frame; the transport error path must clean up.
        drop(first);
        wait_until(|| hub.broadcaster().connection_count() == 1).await;

        hub.submit(gestura_core::NewGesture::new(
            "Blair",
            gestura_core::GestureType::Shake,
            "Ready to Answer",
        ))
        .unwrap();
        let msg = tokio::time::timeout(Duration::from_secs(5), second.next())
            .await
            .expect("push should arrive")
            .unwrap()
            .unwrap();
        let pushed: Value = serde_json::from_str(msg.to_text().unwrap()).unwrap();
        assert_eq!(pushed["data"]["studentName"], "Blair");

        second.close(None).await.unwrap();
        wait_until(|| hub.broadcaster().connection_count() == 0).await;
    }
}
