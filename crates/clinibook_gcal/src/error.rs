use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcalError {
    #[error("Calendar API request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Calendar API returned an error: Status={status}, Message='{message}'")]
    ApiError { status: String, message: String },
    #[error("Failed to parse calendar API response: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Calendar authentication failed: {0}")]
    AuthError(String),
    #[error("Calendar configuration missing or incomplete")]
    ConfigError,
}
