use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use gestura_analytics::{Analytics, AnalyticsView};
use gestura_core::motion::{detect_gesture, MotionDelta};
use gestura_core::types::{Gesture, GestureSubmission, GestureType};
use serde::Serialize;

// ── Health ──────────────────────────────────────────────────────────────

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ── Gestures ────────────────────────────────────────────────────────────

pub fn gesture_routes() -> Router<AppState> {
    Router::new()
        .route("/api/gestures", post(create_gesture))
        .route("/api/gestures/today", get(gestures_today))
        .route("/api/gestures/detect", post(detect))
        .route("/api/gestures/{id}", get(get_gesture))
}

async fn create_gesture(
    State(state): State<AppState>,
    payload: Result<Json<GestureSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<Gesture>), ApiError> {
    let Json(submission) = payload?;
    let input = submission.validate().map_err(ApiError::Validation)?;
    let gesture = state
        .hub
        .submit(input)
        .map_err(|e| ApiError::internal("Failed to create gesture", e))?;
    Ok((StatusCode::CREATED, Json(gesture)))
}

async fn gestures_today(State(state): State<AppState>) -> Json<Vec<Gesture>> {
    Json(state.hub.store().today())
}

async fn get_gesture(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Gesture>, ApiError> {
    state
        .hub
        .store()
        .get_by_id(&id)
        .map(Json)
        .ok_or(ApiError::NotFound("Gesture not found"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Detection {
    gesture_type: Option<GestureType>,
    message: Option<&'static str>,
}

async fn detect(payload: Result<Json<MotionDelta>, JsonRejection>) -> Result<Json<Detection>, ApiError> {
    let Json(delta) = payload?;
    let gesture_type = detect_gesture(delta);
    Ok(Json(Detection {
        gesture_type,
        message: gesture_type.map(|g| g.default_message()),
    }))
}

// ── Analytics ───────────────────────────────────────────────────────────

pub fn analytics_routes() -> Router<AppState> {
    Router::new().route("/api/analytics", get(analytics))
}

async fn analytics(State(state): State<AppState>) -> Json<AnalyticsView> {
    let hub = &state.hub;
    let view = Analytics::new(
        hub.store(),
        hub.classifier(),
        state.config.analytics.clone(),
    )
    .compute();
    Json(view)
}
