//! API error handling
//!
//! Every failure renders as an `Error` document with a stable error identifier.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sm_core::error::{SmError, ValidationErrors};

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationErrors),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_identifier(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "urn:sew4mi:api:v1:errors:PropertyConstraintViolation",
            ApiError::BadRequest(_) => "urn:sew4mi:api:v1:errors:InvalidRequestBody",
            ApiError::Internal(_) => "urn:sew4mi:api:v1:errors:InternalError",
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.into())
    }
}

impl From<SmError> for ApiError {
    fn from(err: SmError) -> Self {
        match err {
            SmError::Validation(errors) => ApiError::Validation(errors),
            SmError::Contract(contract) => ApiError::Validation(contract.into()),
            SmError::InvalidInput { .. } => ApiError::BadRequest(err.to_string()),
            SmError::Config(_) | SmError::Internal(_) => ApiError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorDocument {
    #[serde(rename = "_type")]
    type_name: &'static str,
    #[serde(rename = "errorIdentifier")]
    error_identifier: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_identifier = self.error_identifier();

        let (message, details) = match self {
            ApiError::Validation(errors) => {
                let message = errors.full_messages().join(", ");
                let details = (!errors.errors.is_empty()).then_some(errors.errors);
                (message, details)
            }
            ApiError::BadRequest(msg) => (msg, None),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error while handling request");
                (msg, None)
            }
        };

        let body = ErrorDocument {
            type_name: "Error",
            error_identifier,
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
