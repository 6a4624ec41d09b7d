use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocError {
    #[error("No preference data for applicant '{applicant}'")]
    MissingPreferenceData { applicant: String },

    #[error("Capacity is undefined: the slot list is empty")]
    InvalidCapacityConfiguration,

    #[error("Applicant '{applicant}' ranks unknown slot '{slot}'")]
    UnknownSlot { applicant: String, slot: String },

    #[error("Applicant '{applicant}' appears more than once")]
    DuplicateApplicant { applicant: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Request to {url} returned status {status}")]
    HttpStatusError { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Column '{column}' not found in score sheet header")]
    MissingColumnError { column: String },

    #[error("Score '{value}' for applicant '{applicant}' in slot '{slot}' is not a number")]
    ScoreParseError {
        applicant: String,
        slot: String,
        value: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Allocation,
    Io,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AllocError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AllocError::MissingPreferenceData { .. }
            | AllocError::InvalidCapacityConfiguration
            | AllocError::UnknownSlot { .. }
            | AllocError::DuplicateApplicant { .. } => ErrorCategory::Allocation,
            AllocError::ApiError(_) | AllocError::HttpStatusError { .. } => ErrorCategory::Network,
            AllocError::ZipError(_) | AllocError::IoError(_) | AllocError::SerializationError(_) => {
                ErrorCategory::Io
            }
            AllocError::CsvError(_)
            | AllocError::MissingColumnError { .. }
            | AllocError::ScoreParseError { .. }
            | AllocError::ValidationError { .. } => ErrorCategory::Input,
            AllocError::ConfigValidationError { .. }
            | AllocError::InvalidConfigValueError { .. }
            | AllocError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Input | ErrorCategory::Configuration | ErrorCategory::Allocation => {
                ErrorSeverity::High
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AllocError::MissingPreferenceData { .. } => "Supply a preference list for every applicant",
            AllocError::InvalidCapacityConfiguration => {
                "Configure at least one slot column (--slots or [source].slots)"
            }
            AllocError::UnknownSlot { .. } => "Check the slot list against the score sheet header",
            AllocError::DuplicateApplicant { .. } => "Remove duplicated applicant rows",
            AllocError::ApiError(_) | AllocError::HttpStatusError { .. } => {
                "Check the input URL and network connectivity, then retry"
            }
            AllocError::CsvError(_) => "Check that the score sheet is valid CSV with a header row",
            AllocError::MissingColumnError { .. } => {
                "Check the column names passed as slots or name column"
            }
            AllocError::ScoreParseError { .. } => "Scores must be numbers or left empty",
            AllocError::ZipError(_) | AllocError::IoError(_) => {
                "Check file permissions and available disk space"
            }
            AllocError::SerializationError(_) => "Report this as a bug",
            AllocError::ConfigValidationError { .. }
            | AllocError::InvalidConfigValueError { .. }
            | AllocError::MissingConfigError { .. } => "Fix the configuration and run again",
            AllocError::ValidationError { .. } => "Fix the input data and run again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Allocation => format!("Allocation aborted: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read the score sheet: {}", self),
            ErrorCategory::Io => format!("Could not write results: {}", self),
            ErrorCategory::Network => format!("Could not download the score sheet: {}", self),
        }
    }

    /// 依嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, AllocError>;
