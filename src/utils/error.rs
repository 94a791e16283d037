use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Spreadsheet read error: {0}")]
    SpreadsheetReadError(#[from] calamine::XlsxError),

    #[error("Legacy spreadsheet read error: {0}")]
    LegacySpreadsheetReadError(#[from] calamine::XlsError),

    #[error("Spreadsheet write error: {0}")]
    SpreadsheetWriteError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

/// 錯誤分類，用於日誌與退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    FileSystem,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::IoError(_) => ErrorCategory::FileSystem,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::SpreadsheetReadError(_)
            | EtlError::LegacySpreadsheetReadError(_)
            | EtlError::SpreadsheetWriteError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單筆請求失敗不影響整批
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::FileSystem | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) => {
                "Check network connectivity, the CRM endpoint URL and the API credentials"
            }
            EtlError::IoError(_) => {
                "Check that the upload and output folders exist and are writable"
            }
            EtlError::CsvError(_)
            | EtlError::SpreadsheetReadError(_)
            | EtlError::LegacySpreadsheetReadError(_) => {
                "Make sure the uploaded file is a valid .xlsx/.xls workbook or CSV file"
            }
            EtlError::SpreadsheetWriteError(_) => {
                "Check that failedData.xlsx is not open in another program"
            }
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                "Inspect the offending row in the input file"
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the CRM: {}", self),
            ErrorCategory::FileSystem => format!("File system problem: {}", self),
            ErrorCategory::Data => format!("Could not process spreadsheet data: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
