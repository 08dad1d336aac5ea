use async_trait::async_trait;
use image::RgbImage;

use crate::domain::{detection::Detection, errors::DomainResult};

/// Puerto del motor de detección. La imagen ya llega decodificada en RGB;
/// el adaptador devuelve las detecciones en bruto en el orden del modelo.
#[async_trait]
pub trait DetectorPort: Send + Sync {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<Detection>>;
}
