use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Mail relay request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Mail relay returned an error: Status={status}, Message='{message}'")]
    ApiError { status: String, message: String },
    #[error("Failed to parse mail relay response: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Notification configuration missing or incomplete")]
    ConfigError,
}
