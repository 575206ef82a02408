use crate::download::error::TransferError;
use thiserror::Error;

/// Centralized error types for the application
///
/// Every failure inside a command handler ends up here and is reported to the
/// user exactly once at the handler boundary. Uses `thiserror` for automatic
/// error conversion and display formatting.
///
/// # Example
///
/// ```no_run
/// use pickcore::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("[{}] {}", err.category(), err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Empty query, non-numeric or out-of-range selection
    #[error("Invalid input: {0}")]
    UserInput(String),

    /// Provider answered but with nothing usable (no results, no download URL)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Asset or chunk transfer failures
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// HTTP/Fetch errors on provider API calls
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP status code errors on provider API calls
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// IO errors on scratch files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Malformed provider JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Chat transport failures from a non-Telegram surface
    #[error("Chat error: {0}")]
    Chat(String),

    /// Telegram API errors
    #[cfg(feature = "telegram")]
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

impl AppError {
    /// Maps the error onto the user-input / provider / transfer / filesystem taxonomy
    pub fn category(&self) -> &'static str {
        match self {
            AppError::UserInput(_) => "user_input",
            AppError::Provider(_) | AppError::HttpStatus(_) | AppError::Json(_) | AppError::Url(_) => "provider",
            AppError::Transfer(TransferError::Filesystem(_)) | AppError::Io(_) => "filesystem",
            AppError::Transfer(_) | AppError::Http(_) => "transfer",
            AppError::Chat(_) => "chat",
            #[cfg(feature = "telegram")]
            AppError::Telegram(_) => "chat",
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
