use crate::domain::model::BatchStage;
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("No order lines found in command")]
    EmptyCommand,

    #[error("Invalid format in: \"{line}\" (expected PLAYER_ID IDENTIFIER PACKAGE_CODE)")]
    InvalidLineFormat { line: String },

    #[error("No valid package codes found in: \"{line}\"")]
    NoPackageCodes { line: String },

    #[error("Catalogue unavailable for {game}: {message}")]
    CatalogueUnavailable { game: String, message: String },

    #[error("Packages not found for order \"{line}\": {}", codes.join(", "))]
    PackagesNotFound { line: String, codes: Vec<String> },

    #[error("Balance unavailable: {message}")]
    BalanceUnavailable { message: String },

    #[error("Insufficient balance: have {balance} XCN, need {required} XCN (short {shortfall} XCN)")]
    InsufficientBalance {
        balance: Decimal,
        required: Decimal,
        shortfall: Decimal,
    },

    #[error("Order submission timed out after {timeout:?}")]
    SubmissionTimeout { timeout: Duration },

    #[error("Order submission failed: {message}")]
    SubmissionFailed { message: String },

    #[error("Another batch is still being submitted")]
    BatchInProgress,

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
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
    Input,
    Catalogue,
    Funds,
    Submission,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OrderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OrderError::EmptyCommand
            | OrderError::InvalidLineFormat { .. }
            | OrderError::NoPackageCodes { .. } => ErrorCategory::Input,
            OrderError::CatalogueUnavailable { .. } | OrderError::PackagesNotFound { .. } => {
                ErrorCategory::Catalogue
            }
            OrderError::BalanceUnavailable { .. } | OrderError::InsufficientBalance { .. } => {
                ErrorCategory::Funds
            }
            OrderError::SubmissionTimeout { .. }
            | OrderError::SubmissionFailed { .. }
            | OrderError::BatchInProgress => ErrorCategory::Submission,
            OrderError::ApiError(_) => ErrorCategory::Network,
            OrderError::ConfigError { .. }
            | OrderError::InvalidConfigValueError { .. }
            | OrderError::MissingConfigError { .. } => ErrorCategory::Configuration,
            OrderError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Funds => ErrorSeverity::High,
            ErrorCategory::Catalogue => match self {
                OrderError::PackagesNotFound { .. } => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            ErrorCategory::Submission | ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 是否值得原樣重試（使用者不需要修改輸入）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrderError::CatalogueUnavailable { .. }
                | OrderError::BalanceUnavailable { .. }
                | OrderError::SubmissionTimeout { .. }
                | OrderError::BatchInProgress
                | OrderError::ApiError(_)
        )
    }

    /// 批次在哪個階段被拒絕
    pub fn stage(&self) -> BatchStage {
        match self {
            OrderError::EmptyCommand
            | OrderError::InvalidLineFormat { .. }
            | OrderError::NoPackageCodes { .. } => BatchStage::Parsing,
            OrderError::CatalogueUnavailable { .. } | OrderError::PackagesNotFound { .. } => {
                BatchStage::Resolving
            }
            OrderError::BalanceUnavailable { .. } | OrderError::InsufficientBalance { .. } => {
                BatchStage::BalanceCheck
            }
            OrderError::SubmissionTimeout { .. } | OrderError::SubmissionFailed { .. } => {
                BatchStage::Submitting
            }
            _ => BatchStage::Rejected,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            OrderError::EmptyCommand | OrderError::InvalidLineFormat { .. } => {
                "Use the format: PLAYER_ID IDENTIFIER CODE1+CODE2 (one order per line or comma)"
                    .to_string()
            }
            OrderError::NoPackageCodes { .. } => {
                "Add at least one package code after the identifier".to_string()
            }
            OrderError::PackagesNotFound { .. } => {
                "Check the package codes against the catalogue for the selected game".to_string()
            }
            OrderError::InsufficientBalance { shortfall, .. } => {
                format!("Top up at least {} XCN or remove some packages", shortfall)
            }
            OrderError::CatalogueUnavailable { .. }
            | OrderError::BalanceUnavailable { .. }
            | OrderError::ApiError(_) => "Check your connection and try again".to_string(),
            OrderError::SubmissionTimeout { .. } | OrderError::SubmissionFailed { .. } => {
                "Check the transaction history before re-submitting this order".to_string()
            }
            OrderError::BatchInProgress => {
                "Wait for the current batch to finish before submitting another".to_string()
            }
            OrderError::ConfigError { .. }
            | OrderError::InvalidConfigValueError { .. }
            | OrderError::MissingConfigError { .. } => {
                "Review the configuration file and command-line flags".to_string()
            }
            OrderError::IoError(_) => {
                "Retry; if the problem persists, report it with the logs".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OrderError::ApiError(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            OrderError::ApiError(_) => "Could not reach the server".to_string(),
            OrderError::IoError(_) => "A local file could not be read or written".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrderError>;
