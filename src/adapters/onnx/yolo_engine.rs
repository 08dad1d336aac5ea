use anyhow::Result;
use image::{imageops::FilterType, RgbImage};
use ndarray::{s, Array4, ArrayViewD, Axis, IxDyn};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Value;
use std::fs;

use crate::domain::detection::Detection;
use crate::domain::model::YoloParams;

/// Motor de inferencia YOLO sobre ONNX Runtime. Se carga una sola vez al
/// arrancar; después la sesión solo se lee.
pub struct OnnxYoloEngine {
    session: Session,
    labels: Vec<String>,
}

impl OnnxYoloEngine {
    pub fn load(path: &str, labels: Vec<String>) -> Result<Self> {
        let mut builder = Session::builder()?.with_intra_threads(4)?;

        // CUDA es opcional: si está disponible se registra, si no continuamos en CPU.
        let cuda = CUDAExecutionProvider::default().build();
        if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
            builder = builder_with_cuda;
        }

        let model_bytes = fs::read(path)?;
        let session = builder.commit_from_memory(&model_bytes)?;

        Ok(Self { session, labels })
    }

    /// Sin fichero de clases, el id numérico hace de etiqueta.
    fn label_for(&self, class_id: usize) -> String {
        self.labels
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| class_id.to_string())
    }

    /// Tensor NCHW f32 normalizado a [0,1], tamaño de entrada del modelo.
    fn preprocess(rgb: &RgbImage, imgsz: usize) -> Array4<f32> {
        let resized = image::imageops::resize(rgb, imgsz as u32, imgsz as u32, FilterType::Nearest);
        let mut input = Array4::<f32>::zeros((1, 3, imgsz, imgsz));
        for (x, y, pixel) in resized.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }
        input
    }

    pub fn infer(&mut self, rgb: &RgbImage, params: &YoloParams) -> Result<Vec<Detection>> {
        let imgsz = params.input_size as usize;
        let input = Self::preprocess(rgb, imgsz);

        let input_shape = vec![1, 3, imgsz as i64, imgsz as i64];
        let input_tensor = Value::from_array((input_shape, input.into_raw_vec()))?;

        // Borrow `labels` (disjoint field) before the session borrow held by `outputs`.
        let labels = &self.labels;
        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        // Salida YOLO: [1, 4 + clases, candidatos]
        let dims: Vec<usize> = shape_out.into_iter().map(|&x| x as usize).collect();
        let array_view = ArrayViewD::from_shape(IxDyn(&dims), data_out)?;
        let view = array_view.index_axis(Axis(0), 0);

        let num_candidates = view.shape()[1];
        let sx = rgb.width() as f32 / imgsz as f32;
        let sy = rgb.height() as f32 / imgsz as f32;

        let mut detections = Vec::new();

        for i in 0..num_candidates {
            let scores = view.slice(s![4.., i]);
            let (class_id, &max_score) = scores
                .indexed_iter()
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
                .unwrap();

            // Corte de candidatos en bruto; el umbral del veredicto se
            // aplica después, en la capa de dominio.
            if max_score > params.conf_threshold {
                let cx = view[[0, i]];
                let cy = view[[1, i]];
                let w = view[[2, i]];
                let h = view[[3, i]];

                detections.push(Detection {
                    x1: (cx - w / 2.0) * sx,
                    y1: (cy - h / 2.0) * sy,
                    x2: (cx + w / 2.0) * sx,
                    y2: (cy + h / 2.0) * sy,
                    score: max_score,
                    class_id,
                    label: labels
                        .get(class_id)
                        .cloned()
                        .unwrap_or_else(|| class_id.to_string()),
                });
            }
        }

        // Orden descendente por confianza: este es el "orden del modelo"
        // que después recorre la política de veredicto.
        detections.sort_unstable_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        Ok(detections.into_iter().take(params.max_detections).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_normalizes_and_shapes() {
        let mut rgb = RgbImage::new(2, 2);
        rgb.put_pixel(0, 0, image::Rgb([255, 0, 128]));

        let input = OnnxYoloEngine::preprocess(&rgb, 2);
        assert_eq!(input.shape(), &[1, 3, 2, 2]);
        assert_eq!(input[[0, 0, 0, 0]], 1.0);
        assert_eq!(input[[0, 1, 0, 0]], 0.0);
        assert!((input[[0, 2, 0, 0]] - 128.0 / 255.0).abs() < 1e-6);
    }
}
