use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

/// JSON body returned for every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g. "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Underlying failure detail, present on server faults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Field -> messages map, present on request-validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Errors produced by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseError(_) | Self::ExportError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message suitable for HTTP responses. Server faults return a generic
    /// message; the underlying cause goes into the `details` field instead.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::ExportError(_) => "Report export failed".to_string(),
            Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    fn response_details(&self) -> Option<String> {
        match self {
            Self::DatabaseError(err) => Some(err.to_string()),
            Self::ExportError(msg) | Self::InternalError(msg) => Some(msg.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: self.response_details(),
            errors: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

/// Error type surfaced at the HTTP handler boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Validation failed")]
    Validation {
        errors: BTreeMap<String, Vec<String>>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Service(err) => err.into_response(),
            ApiError::Validation { errors } => {
                let body = ErrorResponse {
                    error: "Bad Request".to_string(),
                    message: "Validation failed".to_string(),
                    details: None,
                    errors: Some(errors),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::NotFound(message) => {
                let body = ErrorResponse {
                    error: "Not Found".to_string(),
                    message,
                    details: None,
                    errors: None,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            ApiError::BadRequest(message) => {
                let body = ErrorResponse {
                    error: "Bad Request".to_string(),
                    message,
                    details: None,
                    errors: None,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
        }
    }
}

/// Flatten validator output into a field -> messages map, prefixing nested
/// and list entries with their path (`part_numbers[0].part_number`).
pub fn validation_errors_map(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    collect_validation_errors("", errors, &mut map);
    map
}

fn collect_validation_errors(
    prefix: &str,
    errors: &ValidationErrors,
    map: &mut BTreeMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            (*field).to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                map.insert(key, messages);
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_validation_errors(&key, nested, map);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_errors(&format!("{key}[{index}]"), nested, map);
                }
            }
        }
    }
}
