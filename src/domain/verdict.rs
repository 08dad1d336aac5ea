use serde::{Deserialize, Serialize};

use super::detection::Detection;

/// Veredicto final del servicio sobre una imagen subida.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    pub label: Option<String>,
    pub confidence: f32,
    pub bbox: Option<[f32; 4]>,
    pub detections_count: usize,
    pub threshold_used: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl VerificationResult {
    /// Respuesta fija cuando no hay modelo cargado.
    pub fn mock(threshold: f32) -> Self {
        Self {
            verified: true,
            label: Some("mock_pothole".to_string()),
            confidence: 0.85,
            bbox: Some([50.0, 50.0, 200.0, 200.0]),
            detections_count: 1,
            threshold_used: threshold,
            note: Some("Mock response - model not loaded".to_string()),
        }
    }
}

/// Política de veredicto: recorre las detecciones EN EL ORDEN en que las
/// produjo el modelo y gana la PRIMERA cuya confianza alcanza el umbral
/// (no la de mayor confianza). Si ninguna lo alcanza, no hay verificación.
/// `detections_count` siempre cuenta el total en bruto.
pub fn evaluate(detections: &[Detection], threshold: f32) -> VerificationResult {
    let mut result = VerificationResult {
        verified: false,
        label: None,
        confidence: 0.0,
        bbox: None,
        detections_count: detections.len(),
        threshold_used: threshold,
        note: None,
    };

    for det in detections {
        if det.score >= threshold {
            result.verified = true;
            result.label = Some(det.label.clone());
            result.confidence = round4(det.score);
            result.bbox = Some(det.bbox());
            break;
        }
    }

    result
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(score: f32, class_id: usize, label: &str) -> Detection {
        Detection {
            x1: 10.0 * class_id as f32,
            y1: 20.0,
            x2: 10.0 * class_id as f32 + 5.0,
            y2: 25.0,
            score,
            class_id,
            label: label.to_string(),
        }
    }

    #[test]
    fn first_match_wins_over_best_match() {
        // Confianzas desordenadas a propósito: gana la primera que supera
        // el umbral, no la máxima.
        let dets = vec![det(0.5, 0, "bache"), det(0.9, 1, "grieta"), det(0.7, 2, "socavón")];
        let result = evaluate(&dets, 0.6);

        assert!(result.verified);
        assert_eq!(result.label.as_deref(), Some("grieta"));
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.bbox, Some([10.0, 20.0, 15.0, 25.0]));
        assert_eq!(result.detections_count, 3);
        assert_eq!(result.threshold_used, 0.6);
    }

    #[test]
    fn no_detection_reaches_threshold() {
        let dets = vec![det(0.3, 0, "bache"), det(0.55, 1, "grieta")];
        let result = evaluate(&dets, 0.6);

        assert!(!result.verified);
        assert_eq!(result.label, None);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.bbox, None);
        assert_eq!(result.detections_count, 2);
    }

    #[test]
    fn score_equal_to_threshold_qualifies() {
        let dets = vec![det(0.6, 0, "bache")];
        let result = evaluate(&dets, 0.6);
        assert!(result.verified);
        assert_eq!(result.label.as_deref(), Some("bache"));
    }

    #[test]
    fn count_is_independent_of_threshold() {
        let dets = vec![det(0.1, 0, "a"), det(0.2, 1, "b"), det(0.3, 2, "c")];
        assert_eq!(evaluate(&dets, 0.05).detections_count, 3);
        assert_eq!(evaluate(&dets, 0.99).detections_count, 3);
    }

    #[test]
    fn empty_detections_never_verify() {
        let result = evaluate(&[], 0.0);
        assert!(!result.verified);
        assert_eq!(result.detections_count, 0);
    }

    #[test]
    fn confidence_is_rounded_to_four_decimals() {
        let dets = vec![det(0.912_345_6, 0, "bache")];
        let result = evaluate(&dets, 0.5);
        assert_eq!(result.confidence, 0.9123);
    }

    #[test]
    fn note_only_present_on_mock() {
        let mock = VerificationResult::mock(0.6);
        assert!(mock.verified);
        assert_eq!(mock.label.as_deref(), Some("mock_pothole"));
        assert_eq!(mock.confidence, 0.85);
        assert_eq!(mock.bbox, Some([50.0, 50.0, 200.0, 200.0]));
        assert!(mock.note.is_some());

        let real = evaluate(&[det(0.8, 0, "bache")], 0.5);
        let json = serde_json::to_value(&real).unwrap();
        assert!(json.get("note").is_none());
    }
}
