use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, debug, info, warn};
use uuid::Uuid;

use crate::features::HousingFeatures;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

fn bad_request_error(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

#[derive(Clone, Debug)]
pub struct AppState {
    /// Price returned for every valid request
    pub predicted_price: f64,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/predict", post(predict))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Middleware to add correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Prediction stub service",
        "endpoints": {
            "POST /predict": "Decode housing attributes and return a fixed price",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = body.map_err(|e| {
        warn!(error = %e, "Unreadable prediction request");
        bad_request_error(&e.body_text())
    })?;

    let features = HousingFeatures::from_request(&body).map_err(|e| {
        warn!(error = %e, "Rejecting prediction request");
        bad_request_error(&e.to_string())
    })?;

    debug!(features = ?features.to_vector(), "Decoded housing features");

    let predicted_price = round_cents(state.predicted_price);
    info!(predicted_price, "Returning stub prediction");

    Ok(Json(json!({ "predicted_price": predicted_price })))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
