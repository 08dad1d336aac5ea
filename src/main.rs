use std::sync::Arc;

use tower_http::trace::TraceLayer;
use yolo_verify_api::adapters::http::{router, state::HttpState};
use yolo_verify_api::adapters::onnx::detector::load_detector;
use yolo_verify_api::application::services::VerificationService;
use yolo_verify_api::config::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Inicializar logs (RUST_LOG=info por defecto)
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    // 2. Leer la configuración del entorno
    let config = Arc::new(ServiceConfig::from_env());

    tracing::info!("🔧 Inicializando el motor de detección...");

    // 3. Cargar el modelo una sola vez. Si falla, el servicio arranca
    //    igualmente en modo simulado (respuestas mock en /verify).
    let detector = load_detector(&config);

    // 4. Instanciar el servicio de verificación (Capa de Aplicación)
    let verify = Arc::new(VerificationService::new(detector, config.conf_threshold));

    // 5. Configurar el Estado de la API y el Router de Axum
    let state = HttpState {
        verify,
        config: config.clone(),
    };

    let app = router(state).layer(TraceLayer::new_for_http());

    // 6. Lanzar el Servidor
    let addr = format!("0.0.0.0:{}", config.port);

    tracing::info!("🚀 Servicio de verificación iniciado en http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
