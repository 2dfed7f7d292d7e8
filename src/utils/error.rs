use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Template rendering error: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Storage,
    Data,
    Presentation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RegistryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RegistryError::ConfigError { .. }
            | RegistryError::InvalidConfigValueError { .. }
            | RegistryError::MissingConfigError { .. } => ErrorCategory::Configuration,
            RegistryError::IoError(_) => ErrorCategory::Storage,
            RegistryError::CsvError(_)
            | RegistryError::ProcessingError { .. }
            | RegistryError::ValidationError { .. } => ErrorCategory::Data,
            RegistryError::SerializationError(_) | RegistryError::TemplateError(_) => {
                ErrorCategory::Presentation
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RegistryError::ValidationError { .. } => ErrorSeverity::Low,
            RegistryError::CsvError(_) | RegistryError::ProcessingError { .. } => {
                ErrorSeverity::Medium
            }
            RegistryError::IoError(_)
            | RegistryError::SerializationError(_)
            | RegistryError::TemplateError(_) => ErrorSeverity::High,
            RegistryError::ConfigError { .. }
            | RegistryError::InvalidConfigValueError { .. }
            | RegistryError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the TOML config file and command line flags"
            }
            ErrorCategory::Storage => "Check that the CSV paths exist and are writable",
            ErrorCategory::Data => "Check the CSV file for broken rows or a wrong header",
            ErrorCategory::Presentation => "Check the template and static asset directories",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RegistryError::MissingConfigError { field } => {
                format!("設定項目 '{}' がありません", field)
            }
            RegistryError::InvalidConfigValueError { field, reason, .. } => {
                format!("設定項目 '{}' が不正です: {}", field, reason)
            }
            RegistryError::IoError(e) => format!("ファイル操作に失敗しました: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_critical() {
        let err = RegistryError::MissingConfigError {
            field: "sources.csv_paths".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("sources.csv_paths"));
    }

    #[test]
    fn test_validation_errors_are_low_severity() {
        let err = RegistryError::ValidationError {
            message: "prefecture is empty".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }
}
