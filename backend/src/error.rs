//! Error handling for the poultry ledger server
//!
//! Provides consistent error responses in English and Indonesian

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{FieldError, ValidationErrors};
use thiserror::Error;

use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// One or more input fields failed validation; nothing was persisted
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// The backing store rejected or could not complete an operation
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, AppError::Persistence(_))
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDetail>,
}

/// A failing field as shown to the user
#[derive(Serialize)]
pub struct FieldDetail {
    pub field: String,
    pub issue: shared::FieldIssue,
    pub message_en: String,
    pub message_id: String,
}

impl From<&FieldError> for FieldDetail {
    fn from(e: &FieldError) -> Self {
        Self {
            field: e.field.clone(),
            issue: e.issue,
            message_en: format!("{} {}", e.field, e.issue.message_en()),
            message_id: format!("{} {}", e.field, e.issue.message_id()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: "Please complete all fields correctly".to_string(),
                    message_id: "Mohon lengkapi semua field dengan benar".to_string(),
                    fields: errors.0.iter().map(FieldDetail::from).collect(),
                },
            ),
            AppError::Persistence(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "PERSISTENCE_ERROR".to_string(),
                    message_en: "Failed to save or load data. Please try again.".to_string(),
                    message_id: "Gagal menyimpan atau memuat data. Silakan coba lagi."
                        .to_string(),
                    fields: Vec::new(),
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message_en: format!("Configuration error: {}", msg),
                    message_id: format!("Kesalahan konfigurasi: {}", msg),
                    fields: Vec::new(),
                },
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_id: "Terjadi kesalahan pada server".to_string(),
                    fields: Vec::new(),
                },
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;
