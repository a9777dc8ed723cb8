use thiserror::Error;

/// Message shown when a failure carries nothing the operator can act on
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Try again!";

/// Errors a console operation can end with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// Console server API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Form validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Errors raised while talking to the console server
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connect, DNS, timeout)
    #[error("Request failed: {0}")]
    Transport(String),

    /// Non-2xx response; `message` is the server's `errors.body` when present
    #[error("Server rejected the request (status {status}){}", rejection_suffix(.message))]
    Rejected { status: u16, message: Option<String> },

    /// 2xx response whose body could not be decoded
    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    /// Invalid API root or request URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

fn rejection_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl ApiError {
    /// The server-supplied message, if the server sent a structured one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    /// Text for a failure notification: the server message verbatim, or the generic one
    pub fn user_message(&self) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
    }
}

/// Form field validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    Field {
        field: &'static str,
        message: String,
    },
}

impl ValidationError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field,
            message: message.into(),
        }
    }

    /// The message without the field prefix, as shown under a form input
    pub fn message(&self) -> &str {
        match self {
            ValidationError::Field { message, .. } => message,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Validation errors
    #[error("Configuration validation failed: {0}")]
    Validation(String),

    /// A command needs a node but none was configured
    #[error("No node selected; pass --node or set console.default_node")]
    NoNode,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ConsoleError>;

impl ConsoleError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Api(err) => err.user_message(),
            ConsoleError::Validation(err) => err.message().to_string(),
        }
    }
}
