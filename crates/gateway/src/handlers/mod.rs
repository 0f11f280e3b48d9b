//! API handlers module

pub mod analysis;
pub mod brands;
pub mod dashboard;
pub mod health;
pub mod queries;

use axum::Json;
use brandlens_common::errors::AppError;
use serde::Serialize;
use validator::Validate;

/// Success envelope shared by all data endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

/// Run derive-based validation, reporting the first offending field
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request.validate().map_err(AppError::from)
}
