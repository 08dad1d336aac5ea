use std::env;

use crate::domain::model::YoloParams;

/// Configuración del servicio, leída del entorno al arrancar.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Ruta al fichero ONNX del modelo de detección.
    pub model_path: String,
    /// Fichero de etiquetas (una clase por línea) junto al modelo.
    pub labels_path: String,
    /// Umbral de confianza para el veredicto (no el del motor YOLO).
    pub conf_threshold: f32,
    /// Clave compartida para el token Bearer. `None` = acceso libre (desarrollo).
    pub api_key: Option<String>,
    pub port: u16,
    pub yolo: YoloParams,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: "models/best.onnx".to_string(),
            labels_path: "models/classes.txt".to_string(),
            conf_threshold: 0.6,
            api_key: None,
            port: 8000,
            yolo: YoloParams::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_path: env::var("MODEL_PATH").unwrap_or(defaults.model_path),
            labels_path: env::var("LABELS_PATH").unwrap_or(defaults.labels_path),
            conf_threshold: parse_or("CONF_THRESHOLD", defaults.conf_threshold),
            api_key: normalize_key(env::var("INTERNAL_API_KEY").ok()),
            port: parse_or("PORT", defaults.port),
            yolo: YoloParams::default(),
        }
    }
}

/// Una clave vacía equivale a no tener clave configurada.
fn normalize_key(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.is_empty())
}

/// Valores numéricos ilegibles no tumban el arranque: se avisa y se usa
/// el valor por defecto.
fn parse_or<T: std::str::FromStr + std::fmt::Display>(var: &str, default: T) -> T {
    match env::var(var) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("⚠️ Valor inválido en {}={:?}; se usa {}", var, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_counts_as_unset() {
        assert_eq!(normalize_key(Some(String::new())), None);
        assert_eq!(normalize_key(None), None);
        assert_eq!(
            normalize_key(Some("secreto".to_string())),
            Some("secreto".to_string())
        );
    }

    #[test]
    fn defaults_match_service_contract() {
        let config = ServiceConfig::default();
        assert_eq!(config.conf_threshold, 0.6);
        assert_eq!(config.port, 8000);
        assert!(config.api_key.is_none());
    }
}
