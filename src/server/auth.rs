//! Bearer authorization for the hub endpoint
//!
//! Outside development the endpoint is protected by the project secret key.
//! The check runs before anything else in the handler, so unauthorized
//! clients never reach feature gating, command parsing, or the request body.

use axum::http::{header, HeaderMap};

use crate::config::{ConfigError, HubConfig};
use crate::server::error::ApiError;

/// How requests to the endpoint are authorized
#[derive(Debug, Clone)]
pub enum AuthPolicy {
    /// No authorization required (development builds)
    Open,

    /// Requests must carry `Authorization: Bearer <secret>`
    Bearer(String),
}

impl AuthPolicy {
    /// Derives the policy from the project configuration
    ///
    /// Development builds are open. Otherwise the project secret key is
    /// required and missing configuration is an error, never a silently
    /// unprotected endpoint.
    pub fn from_config(config: &HubConfig) -> Result<Self, ConfigError> {
        if config.dev {
            return Ok(AuthPolicy::Open);
        }

        match &config.project_secret_key {
            Some(secret) if !secret.is_empty() => Ok(AuthPolicy::Bearer(secret.clone())),
            _ => Err(ConfigError::MissingProjectSecret),
        }
    }

    /// Checks the request headers against this policy
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let expected = match self {
            AuthPolicy::Open => return Ok(()),
            AuthPolicy::Bearer(secret) => secret,
        };

        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        if provided != expected {
            return Err(ApiError::Unauthorized);
        }

        Ok(())
    }
}

/// Rejects the request unless the given feature flag is enabled
pub fn require_feature(enabled: bool, feature: &'static str) -> Result<(), ApiError> {
    if enabled {
        Ok(())
    } else {
        Err(ApiError::FeatureDisabled { feature })
    }
}
