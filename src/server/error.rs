//! API error type for the hub endpoint
//!
//! Every failure path in the endpoint maps to an `ApiError`, which renders as
//! a JSON body with the appropriate HTTP status. The variants are ordered the
//! way the endpoint checks them: authorization, feature gate, request
//! validation, then the binding call itself.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ai::binding::AiError;

/// Errors returned to HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid bearer secret
    #[error("Missing or invalid authorization")]
    Unauthorized,

    /// The project does not have the required feature enabled
    #[error("Cannot use hub.{feature}, the feature is not enabled")]
    FeatureDisabled { feature: &'static str },

    /// The request path or body failed validation
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The AI binding call failed
    #[error(transparent)]
    Upstream(#[from] AiError),
}

impl ApiError {
    /// Shorthand for a validation failure on a named field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::FeatureDisabled { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// JSON body rendered for every error response
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            warn!("Request failed with {}: {}", status, message);
        } else {
            debug!("Request rejected with {}: {}", status, message);
        }

        (
            status,
            Json(ErrorBody {
                status: status.as_u16(),
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::FeatureDisabled { feature: "ai" }.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::validation("model", "cannot be empty").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Upstream(AiError::TimeoutError { seconds: 5 }).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_feature_disabled_message() {
        let error = ApiError::FeatureDisabled { feature: "ai" };
        assert_eq!(
            error.to_string(),
            "Cannot use hub.ai, the feature is not enabled"
        );
    }

    #[test]
    fn test_validation_message_names_the_field() {
        let error = ApiError::validation("model", "cannot be empty");
        assert!(error.to_string().contains("model"));
        assert!(error.to_string().contains("cannot be empty"));
    }
}
