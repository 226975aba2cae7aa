use crate::errors::{ApiError, ServiceError};
use crate::ApiResponse;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Standard success response, wrapped in the API envelope
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Standalone HTML page
pub fn html_response(body: String) -> Response {
    (StatusCode::OK, Html(body)).into_response()
}

/// File download with an attachment disposition
pub fn attachment_response(bytes: Vec<u8>, content_type: &'static str, filename: &str) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

/// 302 to `location`
pub fn found_response(location: &str) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(location).map_err(|_| ApiError::BadRequest {
        message: "redirect target contains invalid characters".to_string(),
        error_code: Some("INVALID_REDIRECT".to_string()),
    })?;
    Ok((StatusCode::FOUND, [(header::LOCATION, value)]).into_response())
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}
