use reqwest::StatusCode;

/// Client-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {message}")]
    ExternalApi { status: StatusCode, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short text a page shows inline when its primary request fails
    pub fn user_message(&self) -> String {
        match self {
            AppError::HttpClient(_) => "Could not reach the server. Please try again.".to_string(),
            AppError::ExternalApi { status, .. } if status.is_server_error() => {
                "The server had a problem loading movies.".to_string()
            }
            AppError::ExternalApi { .. } | AppError::Decode(_) => {
                "Failed to load movies.".to_string()
            }
            AppError::NotFound(what) => format!("{} was not found.", what),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Unauthorized(_) => "Please sign in to continue.".to_string(),
            AppError::Cancelled => String::new(),
            AppError::Config(_) | AppError::Internal(_) => {
                "Something went wrong.".to_string()
            }
        }
    }

    /// True when the failure is worth retrying (transport errors and 5xx)
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::HttpClient(e) => !e.is_decode() && !e.is_builder(),
            AppError::ExternalApi { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
