use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};
use sysinfo::System;
use tracing::info;

use crate::adapters::http::{auth::check_bearer, state::HttpState, ApiError};
use crate::application::dto::{
    DetailedHealthResponse, HealthResponse, LiveResponse, ModelHealth, ReadyResponse,
    SystemHealth, SERVICE_NAME, SERVICE_VERSION,
};
use crate::domain::{errors::DomainError, verdict::VerificationResult};

pub async fn health(State(st): State<HttpState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
        model_loaded: st.verify.model_loaded(),
    })
}

pub async fn health_detailed(State(st): State<HttpState>) -> Json<DetailedHealthResponse> {
    let sys = System::new_all();
    let total = sys.total_memory();
    let memory_percent = if total == 0 {
        0.0
    } else {
        sys.used_memory() as f32 / total as f32 * 100.0
    };

    let cuda_available = CUDAExecutionProvider::default()
        .is_available()
        .unwrap_or(false);

    Json(DetailedHealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
        model: ModelHealth {
            path: st.config.model_path.clone(),
            loaded: st.verify.model_loaded(),
            confidence_threshold: st.verify.threshold(),
        },
        system: SystemHealth {
            cpu_percent: sys.global_cpu_info().cpu_usage(),
            memory_percent,
            cuda_available,
        },
    })
}

pub async fn ready(State(st): State<HttpState>) -> Result<Json<ReadyResponse>, ApiError> {
    if !st.verify.model_loaded() {
        return Err(DomainError::ModelUnavailable.into());
    }

    Ok(Json(ReadyResponse {
        status: "ready".to_string(),
        model_loaded: true,
    }))
}

pub async fn live() -> Json<LiveResponse> {
    Json(LiveResponse {
        status: "alive".to_string(),
        pid: std::process::id(),
    })
}

/// Sube una imagen (multipart, campo `file`), ejecuta el modelo y
/// devuelve el veredicto. El token se comprueba antes de tocar el cuerpo.
pub async fn verify_image(
    State(st): State<HttpState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<VerificationResult>, ApiError> {
    check_bearer(&headers, st.config.api_key.as_deref())?;

    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| DomainError::InvalidInput("Invalid multipart payload".to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        info!("🟡 Fichero recibido: {:?} ({})", field.file_name(), content_type);

        if !content_type.starts_with("image/") {
            return Err(DomainError::InvalidInput("File must be an image".to_string()).into());
        }

        let data = field
            .bytes()
            .await
            .map_err(|_| DomainError::InvalidInput("Invalid multipart payload".to_string()))?;
        upload = Some(data);
        break;
    }

    let Some(data) = upload else {
        return Err(DomainError::InvalidInput("No file uploaded".to_string()).into());
    };

    // Decodificación con formato detectado por contenido; todo se
    // normaliza a RGB8 antes de la inferencia.
    let rgb = image::load_from_memory(&data)
        .map_err(|_| DomainError::InvalidInput("Invalid image".to_string()))?
        .to_rgb8();

    let result = st.verify.verify(rgb).await?;
    info!(
        "✅ Veredicto: verified={} label={:?} ({} detecciones)",
        result.verified, result.label, result.detections_count
    );

    Ok(Json(result))
}
