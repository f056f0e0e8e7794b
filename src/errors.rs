use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use askama::Template;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage<'a> {
    status: u16,
    code: &'a str,
    message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbError(#[from] DbErr),

    #[error("Reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error")]
    Internal,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DbError(_)
            | AppError::ReqwestError(_)
            | AppError::JsonError(_)
            | AppError::Template(_)
            | AppError::Hash(_)
            | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ExternalApiError(_) | AppError::Storage(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::SEE_OTHER,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Anonymous visitors are sent back to the landing page.
        if let AppError::Unauthorized(_) = self {
            return HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/"))
                .finish();
        }

        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}: {}", self.code(), self);
        }

        // Internal details stay in the logs.
        let message = match self {
            AppError::NotFound(_)
            | AppError::InvalidInput(_)
            | AppError::Forbidden(_)
            | AppError::ExternalApiError(_) => self.to_string(),
            _ => "Something went wrong on our side, please try again later".to_string(),
        };

        let page = ErrorPage {
            status: status.as_u16(),
            code: self.code(),
            message,
        };

        match page.render() {
            Ok(body) => HttpResponse::build(status)
                .content_type("text/html; charset=utf-8")
                .body(body),
            Err(_) => HttpResponse::build(status).body(self.to_string()),
        }
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DbError(_) => "DB_ERROR",
            AppError::ReqwestError(_) => "HTTP_ERROR",
            AppError::JsonError(_) => "JSON_ERROR",
            AppError::Template(_) => "TEMPLATE_ERROR",
            AppError::Hash(_) => "HASH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal => "INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_redirects_home() {
        let response = AppError::Unauthorized("no session".to_string()).error_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/"
        );
    }

    #[test]
    fn not_found_renders_html() {
        let response = AppError::NotFound("Post not found".to_string()).error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(AppError::Internal.code(), "INTERNAL");
        assert_eq!(AppError::Storage("x".into()).code(), "STORAGE_ERROR");
        assert_eq!(
            AppError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
