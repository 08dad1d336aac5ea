use std::sync::Arc;

use image::RgbImage;
use tracing::{info, warn};

use crate::application::ports::DetectorPort;
use crate::domain::{
    errors::DomainResult,
    verdict::{evaluate, VerificationResult},
};

/// Servicio de verificación: orquesta la inferencia y aplica la política
/// de veredicto. Si el modelo no llegó a cargarse, responde con el
/// resultado simulado en lugar de fallar.
pub struct VerificationService {
    detector: Option<Arc<dyn DetectorPort>>,
    threshold: f32,
}

impl VerificationService {
    pub fn new(detector: Option<Arc<dyn DetectorPort>>, threshold: f32) -> Self {
        Self { detector, threshold }
    }

    pub fn model_loaded(&self) -> bool {
        self.detector.is_some()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub async fn verify(&self, image: RgbImage) -> DomainResult<VerificationResult> {
        let Some(detector) = &self.detector else {
            warn!("⚠️ Modelo no disponible: se devuelve la respuesta simulada");
            return Ok(VerificationResult::mock(self.threshold));
        };

        let detections = detector.detect(image).await?;
        info!("🔄 El modelo detectó {} objetos", detections.len());

        Ok(evaluate(&detections, self.threshold))
    }
}
