//! API response envelope and error mapping

use actix_web::HttpResponse;
use serde::Serialize;
use tracing::error;

use crate::errors::LinkpulseError;

/// Uniform JSON envelope: `{code, message?, data?}`. Code "0" is success;
/// error codes are the stable `LinkpulseError` codes.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: "0".to_string(),
            message: None,
            data: Some(data),
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: Some(message.to_string()),
            data: None,
        }
    }
}

/// Map a service error to an HTTP response. Client-caused errors carry their
/// message; upstream/internal failures are logged in full and surfaced as a
/// generic envelope with no internal detail.
pub fn error_response(err: &LinkpulseError) -> HttpResponse {
    match err {
        LinkpulseError::Validation(_) => {
            HttpResponse::BadRequest().json(ApiResponse::<()>::error(err.code(), err.message()))
        }
        LinkpulseError::NotFound(_) => {
            HttpResponse::NotFound().json(ApiResponse::<()>::error(err.code(), err.message()))
        }
        LinkpulseError::Forbidden(_) => {
            HttpResponse::Forbidden().json(ApiResponse::<()>::error(err.code(), err.message()))
        }
        LinkpulseError::Unauthorized(_) | LinkpulseError::Token(_) => {
            HttpResponse::Unauthorized().json(ApiResponse::<()>::error(err.code(), err.message()))
        }
        LinkpulseError::Conflict(_) => {
            HttpResponse::Conflict().json(ApiResponse::<()>::error(err.code(), err.message()))
        }
        _ => {
            error!("Internal error: {}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error(err.code(), "Internal server error"))
        }
    }
}
