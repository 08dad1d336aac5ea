pub mod auth;
pub mod routes;
pub mod state;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::adapters::http::state::HttpState;
use crate::domain::errors::DomainError;

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/health/detailed", get(routes::health_detailed))
        .route("/ready", get(routes::ready))
        .route("/live", get(routes::live))
        .route("/verify", post(routes::verify_image))
        .with_state(state)
}

/// Traducción de errores de dominio a respuestas HTTP. Los fallos de
/// inferencia nunca exponen la causa al cliente: se registra en el
/// servidor y se responde con un mensaje genérico.
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            DomainError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            DomainError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            DomainError::ModelUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "Model not loaded".to_string())
            }
            DomainError::Inference(detail) => {
                tracing::error!("❌ Error de inferencia del modelo: {detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Model inference failed".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
