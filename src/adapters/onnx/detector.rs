use async_trait::async_trait;
use image::RgbImage;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::adapters::onnx::yolo_engine::OnnxYoloEngine;
use crate::application::ports::DetectorPort;
use crate::config::ServiceConfig;
use crate::domain::{
    detection::Detection,
    errors::{DomainError, DomainResult},
    model::YoloParams,
};

/// Adaptador de detección sobre el motor ONNX. La sesión exige `&mut`
/// para ejecutarse, así que vive tras un Mutex y la inferencia corre en
/// el pool bloqueante de Tokio; el lock nunca cruza un `await`.
pub struct OnnxDetector {
    engine: Arc<Mutex<OnnxYoloEngine>>,
    params: YoloParams,
}

impl OnnxDetector {
    pub fn load(model_path: &str, labels_path: &str, params: YoloParams) -> anyhow::Result<Self> {
        if !Path::new(model_path).exists() {
            anyhow::bail!("fichero de modelo no encontrado: {}", model_path);
        }

        let labels = read_labels(labels_path);
        let engine = OnnxYoloEngine::load(model_path, labels)?;

        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            params,
        })
    }
}

#[async_trait]
impl DetectorPort for OnnxDetector {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<Detection>> {
        let engine = self.engine.clone();
        let params = self.params.clone();

        let detections = tokio::task::spawn_blocking(move || {
            let mut engine = engine
                .lock()
                .map_err(|_| anyhow::anyhow!("lock del motor envenenado"))?;
            engine.infer(&image, &params)
        })
        .await
        .map_err(|e| DomainError::Inference(e.to_string()))?
        .map_err(|e| DomainError::Inference(e.to_string()))?;

        Ok(detections)
    }
}

/// Carga el modelo al arrancar el proceso. Cualquier fallo deja el
/// servicio en modo simulado en lugar de impedir el arranque.
pub fn load_detector(config: &ServiceConfig) -> Option<Arc<dyn DetectorPort>> {
    match OnnxDetector::load(&config.model_path, &config.labels_path, config.yolo.clone()) {
        Ok(detector) => {
            info!("✅ Modelo cargado desde {}", config.model_path);
            Some(Arc::new(detector))
        }
        Err(e) => {
            warn!("⚠️ No se pudo cargar el modelo ({e}); se usarán respuestas simuladas");
            None
        }
    }
}

/// Una clase por línea, en el orden de los índices del modelo. Si el
/// fichero no existe se devuelve una tabla vacía y el motor etiqueta por
/// índice numérico.
fn read_labels(path: &str) -> Vec<String> {
    let Ok(file) = File::open(path) else {
        warn!("Fichero de clases no encontrado: {}", path);
        return Vec::new();
    };
    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
