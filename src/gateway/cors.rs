// CORS allow-list and the guard that refuses foreign origins

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::error::ApiError;

/// Origins the frontend may call from, shared with the origin guard
#[derive(Debug, Clone)]
pub struct AllowedOrigins(Arc<Vec<String>>);

impl AllowedOrigins {
    pub fn new(origins: Vec<String>) -> Self {
        Self(Arc::new(origins))
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }

    fn header_values(&self) -> Vec<HeaderValue> {
        self.0
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring unusable CORS origin: {}", origin);
                    None
                }
            })
            .collect()
    }
}

/// CORS layer echoing only allow-listed origins, credentials enabled
pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.header_values()))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Refuse requests whose Origin header is not allow-listed
///
/// Requests without an Origin header pass through untouched.
pub async fn origin_guard(
    State(origins): State<AllowedOrigins>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let origin = origin.to_str().unwrap_or_default();
        if !origins.contains(origin) {
            return Err(ApiError::OriginNotAllowed(origin.to_string()));
        }
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_exact() {
        let origins = AllowedOrigins::new(vec!["http://localhost:5173".to_string()]);
        assert!(origins.contains("http://localhost:5173"));
        assert!(!origins.contains("http://localhost:5173/"));
        assert!(!origins.contains("http://localhost"));
    }

    #[test]
    fn test_unusable_origins_are_skipped() {
        let origins = AllowedOrigins::new(vec![
            "https://faz.example".to_string(),
            "bad\norigin".to_string(),
        ]);
        assert_eq!(origins.header_values().len(), 1);
    }
}
