use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("{endpoint} request rejected ({status}){}", format_message(.message))]
    ProviderRejected {
        endpoint: &'static str,
        status: String,
        message: Option<String>,
    },
    #[error("no location candidate found for district: {0}")]
    UnresolvableDistrict(String),
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
    #[error("{0}")]
    Config(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// True for failures talking to the maps provider, rate limiting included.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, AppError::Transport(_) | AppError::ProviderRejected { .. })
    }
}

fn format_message(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|text| format!(": {text}"))
        .unwrap_or_default()
}
