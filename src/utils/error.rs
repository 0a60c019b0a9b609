use thiserror::Error;

/// Handshake step that failed, carried by [`DocuSignError::AuthenticationFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    Assertion,
    TokenExchange,
    UserInfo,
}

impl std::fmt::Display for AuthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuthStage::Assertion => "assertion signing",
            AuthStage::TokenExchange => "token exchange",
            AuthStage::UserInfo => "user info",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum DocuSignError {
    #[error("DocuSign configuration does not include {field}")]
    ConfigurationMissing { field: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing '{field}' in {record} #{index}")]
    MissingField {
        record: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("Email incorrectly formatted for recipient #{index}: {email}")]
    InvalidEmail { index: usize, email: String },

    #[error("Unknown recipient group '{group}' for recipient #{index}")]
    UnknownRecipientGroup { index: usize, group: String },

    #[error("Invalid tab type: {tab_type}")]
    UnknownTabType { tab_type: String },

    #[error("Value cannot be controlled for tab type {tab_type}")]
    ValueNotControllable { tab_type: String },

    #[error("Invalid custom field type '{field_type}' in custom field #{index}")]
    InvalidCustomFieldType { index: usize, field_type: String },

    #[error("Authentication failed during {stage}: {message}")]
    AuthenticationFailed {
        stage: AuthStage,
        status: Option<u16>,
        message: String,
    },

    #[error("Envelope submission failed with status {status}: {body}")]
    EnvelopeSubmissionFailed { status: u16, body: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Authentication,
    Network,
    System,
}

/// Every error ends the CLI with a non-zero exit code; the level picks which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl DocuSignError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DocuSignError::ConfigurationMissing { .. } | DocuSignError::ConfigError { .. } => {
                ErrorCategory::Configuration
            }
            DocuSignError::MissingField { .. }
            | DocuSignError::InvalidEmail { .. }
            | DocuSignError::UnknownRecipientGroup { .. }
            | DocuSignError::UnknownTabType { .. }
            | DocuSignError::ValueNotControllable { .. }
            | DocuSignError::InvalidCustomFieldType { .. } => ErrorCategory::Validation,
            DocuSignError::AuthenticationFailed { .. } => ErrorCategory::Authentication,
            DocuSignError::EnvelopeSubmissionFailed { .. } | DocuSignError::ApiError(_) => {
                ErrorCategory::Network
            }
            DocuSignError::IoError(_) | DocuSignError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 暫時性錯誤，呼叫端可自行重試
            DocuSignError::ApiError(_) => ErrorSeverity::Medium,
            DocuSignError::EnvelopeSubmissionFailed { status, .. } if *status >= 500 => {
                ErrorSeverity::Medium
            }
            DocuSignError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// True when the failure happened before any request left the process.
    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DocuSignError::ConfigurationMissing { field } => {
                format!("Add '{}' to the [docusign] configuration section", field)
            }
            DocuSignError::ConfigError { .. } => {
                "Check the configuration file syntax and values".to_string()
            }
            DocuSignError::MissingField { field, .. } => {
                format!("Supply '{}' or enable automatic id assignment", field)
            }
            DocuSignError::InvalidEmail { .. } => {
                "Use an address of the form name@domain.tld".to_string()
            }
            DocuSignError::UnknownRecipientGroup { .. } => {
                "Use one of: agents, carbonCopies, certifiedDeliveries, editors, inPersonSigners, intermediaries, seals, signers".to_string()
            }
            DocuSignError::UnknownTabType { .. } => {
                "Use a supported tab type such as signHere, dateSigned or text".to_string()
            }
            DocuSignError::ValueNotControllable { .. } => {
                "Remove 'locked' and 'originalValue' from this tab".to_string()
            }
            DocuSignError::InvalidCustomFieldType { .. } => {
                "Custom field type must be 'list' or 'text'".to_string()
            }
            DocuSignError::AuthenticationFailed { .. } => {
                "Verify the client id, impersonated user and private key, and that consent has been granted via the authorization link".to_string()
            }
            DocuSignError::EnvelopeSubmissionFailed { .. } => {
                "Inspect the response body returned by DocuSign".to_string()
            }
            DocuSignError::ApiError(_) => {
                "Check network connectivity and retry".to_string()
            }
            DocuSignError::IoError(_) => "Check file paths and permissions".to_string(),
            DocuSignError::SerializationError(_) => {
                "Check that the input is valid JSON".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Validation => format!("Envelope rejected before sending: {}", self),
            ErrorCategory::Authentication => format!("Could not authenticate with DocuSign: {}", self),
            ErrorCategory::Network => format!("DocuSign request failed: {}", self),
            ErrorCategory::System => format!("Local failure: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocuSignError>;
