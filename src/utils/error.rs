use thiserror::Error;

#[derive(Error, Debug)]
pub enum PinMapError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Endpoint {endpoint} answered with status {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error on {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Server rejected the submitted pin")]
    SubmissionRejected,

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("Geolocation failed: {message}")]
    GeolocationError { message: String },
}

/// The three user-facing failure families, plus configuration problems that
/// only surface at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Network,
    Geolocation,
    Configuration,
}

impl PinMapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PinMapError::ValidationError { .. } | PinMapError::SubmissionInProgress => {
                ErrorCategory::Validation
            }
            PinMapError::ApiError(_)
            | PinMapError::UnexpectedStatus { .. }
            | PinMapError::MalformedResponse { .. }
            | PinMapError::SerializationError(_)
            | PinMapError::SubmissionRejected => ErrorCategory::Network,
            PinMapError::GeolocationError { .. } => ErrorCategory::Geolocation,
            PinMapError::IoError(_)
            | PinMapError::ConfigError { .. }
            | PinMapError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// Alert text shown to the user.
    pub fn user_message(&self) -> String {
        match self.category() {
            ErrorCategory::Validation => match self {
                PinMapError::SubmissionInProgress => {
                    "Please wait for the current submission to finish.".to_string()
                }
                _ => "Please fill all fields correctly.".to_string(),
            },
            ErrorCategory::Network => {
                "Could not reach the server. Please try again later.".to_string()
            }
            ErrorCategory::Geolocation => "Unable to retrieve your location.".to_string(),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
        }
    }

    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        PinMapError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PinMapError>;
