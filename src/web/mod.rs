//! HTTP error mapping shared by the gallery and art services.

use crate::core::CatalogError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum WebError {
    Catalog(CatalogError),
}

impl From<CatalogError> for WebError {
    fn from(err: CatalogError) -> Self {
        WebError::Catalog(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            WebError::Catalog(CatalogError::NotFound(msg)) => (
                StatusCode::NOT_FOUND,
                format!("{} not found", msg),
                "not_found".to_string(),
            ),
            WebError::Catalog(CatalogError::UnknownServer(id)) => (
                StatusCode::NOT_FOUND,
                format!("gallery server {} is not in the directory", id),
                "not_found".to_string(),
            ),
            WebError::Catalog(CatalogError::Validation(msg)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                msg,
                "input_error".to_string(),
            ),
            WebError::Catalog(CatalogError::BadRequest(msg)) => {
                (StatusCode::BAD_REQUEST, msg, "bad_request".to_string())
            }
            WebError::Catalog(CatalogError::InvalidUri(msg)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "invalid_uri".to_string(),
            ),
            WebError::Catalog(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                "internal_error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            code,
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
