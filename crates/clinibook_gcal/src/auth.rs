//! Token acquisition for the calendar API.
//!
//! The client only needs a bearer token per request; where that token comes
//! from (static config, a service-account exchange, a metadata server) is
//! behind this trait so the REST client stays testable.

use crate::error::GcalError;
use clinibook_config::CalendarConfig;

/// Supplies the bearer token attached to every calendar API call.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Result<String, GcalError>;
}

/// Token provider backed by a pre-issued token from configuration.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Build from the calendar config section; fails when no token is set.
    pub fn from_config(config: &CalendarConfig) -> Result<Self, GcalError> {
        let token = config
            .api_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| GcalError::AuthError("Calendar API token is not set".to_string()))?;

        Ok(Self::new(token))
    }
}

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Result<String, GcalError> {
        Ok(self.token.clone())
    }
}
