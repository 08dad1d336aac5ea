use axum::http::{header, HeaderMap};

use crate::domain::errors::{DomainError, DomainResult};

/// Comparación exacta del token Bearer contra la clave compartida.
/// Sin clave configurada, todas las peticiones pasan (modo desarrollo).
pub fn check_bearer(headers: &HeaderMap, expected: Option<&str>) -> DomainResult<()> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| DomainError::Unauthorized("Missing authorization header".to_string()))?;

    if token != expected {
        return Err(DomainError::Unauthorized("Invalid API key".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn no_configured_key_allows_everything() {
        assert!(check_bearer(&HeaderMap::new(), None).is_ok());
        assert!(check_bearer(&headers_with("Bearer cualquiera"), None).is_ok());
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = check_bearer(&HeaderMap::new(), Some("secreto")).unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[test]
    fn wrong_scheme_is_rejected() {
        let err = check_bearer(&headers_with("Basic secreto"), Some("secreto")).unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[test]
    fn mismatched_token_is_rejected() {
        let err = check_bearer(&headers_with("Bearer otro"), Some("secreto")).unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[test]
    fn exact_match_passes() {
        assert!(check_bearer(&headers_with("Bearer secreto"), Some("secreto")).is_ok());
    }
}
