use thiserror::Error;

#[derive(Error, Debug)]
pub enum DefineryError {
    #[error("Malformed shared parameter document: expected 4 sections, found {sections}")]
    MalformedDocument { sections: usize },

    #[error("Invalid record on line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    #[error("IO error: {0}")]
    IoFailure(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote call failed with status {status}: {message}")]
    RemoteFailure { status: u16, message: String },

    #[error("Authentication failed for user '{username}'")]
    AuthenticationFailed { username: String },

    #[error("Not authenticated: call authenticate() before {operation}")]
    NotAuthenticated { operation: String },

    #[error("Tab-delimited parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Document,
    Io,
    Remote,
    Authentication,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DefineryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedDocument { .. } | Self::InvalidRecord { .. } | Self::Csv(_) => {
                ErrorCategory::Document
            }
            Self::IoFailure(_) => ErrorCategory::Io,
            Self::Http(_) | Self::RemoteFailure { .. } | Self::Serialization(_) => {
                ErrorCategory::Remote
            }
            Self::AuthenticationFailed { .. } | Self::NotAuthenticated { .. } => {
                ErrorCategory::Authentication
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Document | ErrorCategory::Authentication => ErrorSeverity::High,
            ErrorCategory::Io | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MalformedDocument { .. } => {
                "Export the shared parameter file again from the CAD tool; it must contain the META, GROUP and PARAM sections"
            }
            Self::InvalidRecord { .. } => {
                "Fix the reported line or rerun without --strict to skip bad lines"
            }
            Self::Csv(_) => "Check that the file is tab-delimited UTF-8 text",
            Self::IoFailure(_) => "Check that the file exists and is readable",
            Self::Http(_) => "Check the network connection and server.base_url",
            Self::RemoteFailure { .. } => "Retry later or check the server logs",
            Self::Serialization(_) => "The server returned an unexpected payload; check server.base_url",
            Self::AuthenticationFailed { .. } => "Check server.username and server.password",
            Self::NotAuthenticated { .. } => "Log in before issuing requests",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the configuration file",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MalformedDocument { sections } => format!(
                "The file is not a shared parameter file ({} section(s) found, 4 expected)",
                sections
            ),
            Self::InvalidRecord { line, reason } => {
                format!("Parameter on line {} could not be read: {}", line, reason)
            }
            Self::IoFailure(e) => format!("The file could not be read: {}", e),
            Self::AuthenticationFailed { username } => {
                format!("Login failed for '{}'", username)
            }
            Self::RemoteFailure { status, .. } => {
                format!("The server rejected the request (HTTP {})", status)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DefineryError>;
