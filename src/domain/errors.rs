use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error("No autorizado: {0}")]
    Unauthorized(String),
    #[error("Modelo no cargado")]
    ModelUnavailable,
    #[error("Error de inferencia: {0}")]
    Inference(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
