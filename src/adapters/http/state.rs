use std::sync::Arc;

use crate::application::services::VerificationService;
use crate::config::ServiceConfig;

/// Estado compartido para los manejadores HTTP de Axum: el servicio de
/// verificación (caso de uso) y la configuración leída al arrancar.
#[derive(Clone)]
pub struct HttpState {
    pub verify: Arc<VerificationService>,
    pub config: Arc<ServiceConfig>,
}
