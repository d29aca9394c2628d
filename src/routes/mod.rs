//! HTTP handlers mounted under `/api` and the mapping of service errors to
//! JSON responses.

use actix_multipart::form::MultipartFormConfig;
use actix_web::error::InternalError;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde::Serialize;

use crate::repository::errors::RepositoryError;
use crate::services::ServiceError;

pub mod auth;
pub mod contacts;
pub mod users;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidCredentials(_)
            | ServiceError::Unauthorized(_)
            | ServiceError::TokenExpired => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) | ServiceError::Repository(RepositoryError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            ServiceError::Conflict(_)
            | ServiceError::Repository(RepositoryError::ConstraintViolation(_)) => {
                StatusCode::CONFLICT
            }
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Form(_) | ServiceError::TypeConstraint(_) | ServiceError::InvalidToken => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::Upload(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Repository(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let detail = match self {
            ServiceError::Repository(RepositoryError::NotFound) => "Not found".to_string(),
            ServiceError::Repository(RepositoryError::ConstraintViolation(_)) => {
                "Resource already exists".to_string()
            }
            ServiceError::Upload(_) => {
                log::error!("{self}");
                "Avatar upload failed".to_string()
            }
            _ if status.is_server_error() => {
                log::error!("{self}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut response = HttpResponse::build(status);
        if matches!(self, ServiceError::InvalidCredentials(_)) {
            response.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        response.json(ErrorResponse::new(detail))
    }
}

/// Public base URL of the request, e.g. `http://localhost:8000/`.
pub fn base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}/", info.scheme(), info.host())
}

fn unprocessable(err: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(ErrorResponse::new(err.to_string()))
}

/// Malformed JSON bodies are answered with 422.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = unprocessable(&err);
        InternalError::from_response(err, response).into()
    })
}

/// Malformed query strings are answered with 422.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = unprocessable(&err);
        InternalError::from_response(err, response).into()
    })
}

/// Malformed urlencoded bodies are answered with 422.
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req| {
        let response = unprocessable(&err);
        InternalError::from_response(err, response).into()
    })
}

/// Malformed multipart bodies are answered with 422.
pub fn multipart_config() -> MultipartFormConfig {
    MultipartFormConfig::default().error_handler(|err, _req| {
        let response = unprocessable(&err);
        InternalError::from_response(err, response).into()
    })
}
